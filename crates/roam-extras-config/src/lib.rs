pub mod file;
pub mod panels;
pub mod settings;

pub use file::{Config, ConfigError, FileSettings};
pub use panels::{copy_panel, history_panel};
pub use settings::{
    HIGHLIGHT_COPY, INLINE_CODE_COPY, IntSetting, ToggleSetting, TRIGGER_HOUR, YEARS_BACK,
    parse_leading_int,
};
