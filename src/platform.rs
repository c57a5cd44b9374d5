use crate::types::HostInfo;

pub fn get_system_info(force_32bit: bool) -> HostInfo {
    let os = std::env::consts::OS.to_string();
    let arch = std::env::consts::ARCH.to_string();

    let normalized_arch = match arch.as_str() {
        "x86_64" => "amd64".to_string(),
        "aarch64" => "arm64".to_string(),
        _ => arch,
    };

    let can_execute_64bit = !force_32bit && host_is_64bit();
    tracing::trace!(
        "Host: os={}, arch={}, 64-bit capable={}",
        os,
        normalized_arch,
        can_execute_64bit
    );

    HostInfo {
        os,
        arch: normalized_arch,
        can_execute_64bit,
    }
}

fn host_is_64bit() -> bool {
    if cfg!(target_pointer_width = "64") {
        return true;
    }
    // A 32-bit process under WOW64 still runs on a 64-bit OS
    if cfg!(windows) {
        let wow64 = std::env::var("PROCESSOR_ARCHITEW6432").unwrap_or_default();
        let native = std::env::var("PROCESSOR_ARCHITECTURE").unwrap_or_default();
        return is_64bit_arch_name(&wow64) || is_64bit_arch_name(&native);
    }
    false
}

fn is_64bit_arch_name(name: &str) -> bool {
    matches!(name.to_uppercase().as_str(), "AMD64" | "ARM64" | "IA64")
}

/// Appends the host executable suffix to a command stem.
pub fn exe_name(stem: &str) -> String {
    format!("{}{}", stem, std::env::consts::EXE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_32bit_disables_64bit() {
        let info = get_system_info(true);
        assert!(!info.can_execute_64bit);
        assert!(!info.os.is_empty());
    }

    #[test]
    fn test_arch_names() {
        assert!(is_64bit_arch_name("amd64"));
        assert!(is_64bit_arch_name("ARM64"));
        assert!(!is_64bit_arch_name("x86"));
        assert!(!is_64bit_arch_name(""));
    }

    #[test]
    fn test_exe_name() {
        let name = exe_name("python3");
        assert!(name.starts_with("python3"));
        if cfg!(windows) {
            assert_eq!(name, "python3.exe");
        } else {
            assert_eq!(name, "python3");
        }
    }
}
