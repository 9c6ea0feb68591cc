use roam_extras_host::{Control, PanelConfig, SettingSpec, SettingValue};

use crate::settings::{HIGHLIGHT_COPY, INLINE_CODE_COPY, IntSetting, TRIGGER_HOUR, ToggleSetting, YEARS_BACK};

pub const COPY_TAB_TITLE: &str = "Nicer Code Block Copy";
pub const HISTORY_TAB_TITLE: &str = "Last Year Today";

pub fn copy_panel() -> PanelConfig {
    PanelConfig {
        tab_title: COPY_TAB_TITLE.to_string(),
        settings: vec![switch(&INLINE_CODE_COPY), switch(&HIGHLIGHT_COPY)],
    }
}

pub fn history_panel() -> PanelConfig {
    PanelConfig {
        tab_title: HISTORY_TAB_TITLE.to_string(),
        settings: vec![input(&YEARS_BACK), input(&TRIGGER_HOUR)],
    }
}

fn switch(setting: &ToggleSetting) -> SettingSpec {
    SettingSpec {
        id: setting.key.to_string(),
        name: setting.name.to_string(),
        description: setting.description.to_string(),
        default: Some(SettingValue::Bool(setting.default)),
        control: Control::Switch,
    }
}

fn input(setting: &IntSetting) -> SettingSpec {
    SettingSpec {
        id: setting.key.to_string(),
        name: setting.name.to_string(),
        description: setting.description.to_string(),
        default: None,
        control: Control::Input,
    }
}
