//! `masthead settings` command.

use anyhow::{Result, bail};
use serde_json::{Map, Value};

use super::args::SettingsAction;
use super::common::{Workspace, print_json, split_pair};
use crate::log;
use crate::settings::SettingsPatch;

pub async fn run(action: &SettingsAction, ws: &Workspace) -> Result<()> {
    match action {
        SettingsAction::Show { remote, pretty } => {
            if *remote {
                ws.refresh_settings().await;
            }
            print_json(&*ws.settings.current(), *pretty)
        }
        SettingsAction::Set { pairs } => {
            let patch = parse_patch(pairs)?;
            if !ws.settings.save(&patch) {
                bail!("failed to save settings");
            }
            log!("settings"; "saved to {}", ws.config.local.path.display());
            Ok(())
        }
        SettingsAction::Section { section, enabled } => {
            if !ws.settings.update_homepage_section(*section, *enabled) {
                bail!("failed to save settings");
            }
            let state = if *enabled { "shown" } else { "hidden" };
            log!("settings"; "{section} {state}");
            Ok(())
        }
        SettingsAction::Reset => {
            ws.settings.reset();
            log!("settings"; "reset to defaults");
            Ok(())
        }
        SettingsAction::Remote { key, value } => {
            let content = ws.content()?;
            content.upsert_setting(key, value.as_deref()).await?;
            log!("settings"; "remote {key} updated");
            Ok(())
        }
    }
}

/// Build a patch from `camelKey=value` pairs. `null` clears nullable fields.
fn parse_patch(pairs: &[String]) -> Result<SettingsPatch> {
    let mut fields = Map::new();
    for pair in pairs {
        let (key, value) = split_pair(pair)?;
        let value = match value {
            "null" => Value::Null,
            text => Value::String(text.to_string()),
        };
        fields.insert(key.to_string(), value);
    }

    let mut unknown = Vec::new();
    let patch: SettingsPatch = serde_ignored::deserialize(Value::Object(fields), |path: serde_ignored::Path| {
        unknown.push(path.to_string());
    })?;
    if !unknown.is_empty() {
        bail!("unknown settings: {}", unknown.join(", "));
    }
    if patch.is_empty() {
        bail!("nothing to save");
    }
    Ok(patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_patch() {
        let patch = parse_patch(&pairs(&["siteTitle=Acme Weekly", "siteLogo=null"])).unwrap();
        assert_eq!(patch.site_title.as_deref(), Some("Acme Weekly"));
        assert_eq!(patch.site_logo, Some(None));
        assert_eq!(patch.company_name, None);
    }

    #[test]
    fn test_parse_patch_rejects_unknown() {
        let err = parse_patch(&pairs(&["siteTitel=x"])).unwrap_err();
        assert!(err.to_string().contains("siteTitel"));
    }

    #[test]
    fn test_parse_patch_null_only_for_nullable() {
        let patch = parse_patch(&pairs(&["heroMainArticleId=12"])).unwrap();
        assert_eq!(patch.hero_main_article_id, Some(Some("12".into())));
        assert!(parse_patch(&pairs(&["siteTitle=null"])).is_err());
    }
}
