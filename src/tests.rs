#[cfg(test)]
mod tests {
    use crate::config;
    use crate::platform;
    use crate::types::Settings;

    #[test]
    fn test_normalize_key() {
        assert_eq!(config::normalize_key("scripts-dir"), "scripts_dir");
        assert_eq!(config::normalize_key("installRoot"), "install_root");
        assert_eq!(config::normalize_key("force_32bit"), "force_32bit");
    }

    #[test]
    fn test_platform_info() {
        let info = platform::get_system_info(false);
        assert!(!info.os.is_empty());
        assert!(!info.arch.is_empty());
    }

    #[test]
    fn test_host_info_display() {
        let info = platform::get_system_info(true);
        let shown = info.to_string();
        assert!(shown.starts_with(&format!("{}/{}", info.os, info.arch)));
        assert!(shown.ends_with("32-bit"));
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert!(!settings.force_32bit);
        assert!(settings.scripts_dir.contains("pythonup"));
        assert!(settings.catalog_dir.contains("pythonup"));
        assert_ne!(settings.scripts_dir, settings.commands_dir);
    }

    #[test]
    fn test_apply_and_reset_setting() {
        let mut settings = Settings::default();
        config::apply_setting(&mut settings, "scripts-dir", "/tmp/shims").unwrap();
        config::apply_setting(&mut settings, "force-32bit", "yes").unwrap();
        assert_eq!(settings.scripts_dir, "/tmp/shims");
        assert!(settings.force_32bit);
        assert_eq!(
            config::get_setting(&settings, "scripts_dir").as_deref(),
            Some("/tmp/shims")
        );

        config::reset_setting(&mut settings, "scripts_dir").unwrap();
        assert_eq!(settings.scripts_dir, Settings::default().scripts_dir);
        assert!(settings.force_32bit);
    }

    #[test]
    fn test_unknown_setting_is_rejected() {
        let mut settings = Settings::default();
        let err = config::apply_setting(&mut settings, "update-check-days", "5").unwrap_err();
        assert!(err.to_string().contains("not a valid configuration setting"));
        assert!(config::get_setting(&settings, "nope").is_none());
        assert!(config::reset_setting(&mut settings, "nope").is_err());
    }
}
