use std::fs;
use std::path::{Path, PathBuf};

const I2C_UDEV_RULES: [&str; 2] = [
    "/etc/udev/rules.d/45-i2c-permissions.rules",
    "/usr/lib/udev/rules.d/45-i2c-permissions.rules",
];

#[derive(Debug, Clone)]
pub struct PermissionCheckResult {
    pub requirements: Vec<PermissionRequirement>,
}

#[derive(Debug, Clone)]
pub struct PermissionRequirement {
    pub name: &'static str,
    pub description: String,
    pub status: RequirementStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequirementStatus {
    Met,
    NotMet,
    NotApplicable,
    Partial,  // Some devices accessible, enough for DDC/CI to work
}

impl PermissionCheckResult {
    pub fn has_issues(&self) -> bool {
        self.requirements.iter().any(|r| r.status == RequirementStatus::NotMet)
    }

    /// One line per requirement that is not met
    pub fn hints(&self) -> Vec<String> {
        self.requirements
            .iter()
            .filter(|r| r.status == RequirementStatus::NotMet)
            .map(|r| format!("{}: {}", r.name, r.description))
            .collect()
    }
}

/// Check if the current user has the necessary permissions to access I2C devices
pub fn check_i2c_permissions() -> PermissionCheckResult {
    let i2c_devices = find_i2c_devices(Path::new("/dev"));
    let in_i2c_group = is_in_i2c_group();
    let rules_installed = I2C_UDEV_RULES.iter().any(|p| Path::new(p).exists());

    evaluate(&i2c_devices, can_write, in_i2c_group, rules_installed)
}

fn evaluate(
    i2c_devices: &[PathBuf],
    can_write: impl Fn(&Path) -> bool,
    in_i2c_group: bool,
    rules_installed: bool,
) -> PermissionCheckResult {
    let mut requirements = Vec::new();

    // 1. I2C device nodes (i2c-dev loaded)
    requirements.push(PermissionRequirement {
        name: "I2C devices",
        description: if i2c_devices.is_empty() {
            "No /dev/i2c-* devices found, is the i2c-dev module loaded?".to_string()
        } else {
            format!("Found {} I2C device(s)", i2c_devices.len())
        },
        status: if i2c_devices.is_empty() {
            RequirementStatus::NotMet
        } else {
            RequirementStatus::Met
        },
    });

    // 2. DDC/CI needs read and write access
    let accessible_count = i2c_devices.iter().filter(|d| can_write(d.as_path())).count();
    requirements.push(PermissionRequirement {
        name: "I2C read/write access",
        description: if i2c_devices.is_empty() {
            "N/A".to_string()
        } else if accessible_count == i2c_devices.len() {
            format!("Can access all {} device(s)", accessible_count)
        } else if accessible_count > 0 {
            format!("Can access {}/{} device(s)", accessible_count, i2c_devices.len())
        } else {
            "Cannot access any I2C devices".to_string()
        },
        status: if i2c_devices.is_empty() {
            RequirementStatus::NotApplicable
        } else if accessible_count == i2c_devices.len() {
            RequirementStatus::Met
        } else if accessible_count > 0 {
            RequirementStatus::Partial
        } else {
            RequirementStatus::NotMet
        },
    });

    // 3. Group membership and udev rules only matter when access is missing
    let access_missing = !i2c_devices.is_empty() && accessible_count == 0;
    requirements.push(PermissionRequirement {
        name: "i2c group",
        description: if in_i2c_group {
            "User is in i2c group".to_string()
        } else {
            "User not in i2c group".to_string()
        },
        status: if in_i2c_group {
            RequirementStatus::Met
        } else if access_missing {
            RequirementStatus::NotMet
        } else {
            RequirementStatus::NotApplicable
        },
    });

    requirements.push(PermissionRequirement {
        name: "udev rules (I2C)",
        description: if rules_installed {
            "I2C udev rules installed".to_string()
        } else {
            format!("I2C udev rules not found ({})", I2C_UDEV_RULES[0])
        },
        status: if rules_installed {
            RequirementStatus::Met
        } else if access_missing {
            RequirementStatus::NotMet
        } else {
            RequirementStatus::NotApplicable
        },
    });

    PermissionCheckResult { requirements }
}

/// Find all I2C device files under `dev`
fn find_i2c_devices(dev: &Path) -> Vec<PathBuf> {
    (0..256)
        .map(|i| dev.join(format!("i2c-{}", i)))
        .filter(|path| path.exists())
        .collect()
}

/// Check if we can write to a device
fn can_write(path: &Path) -> bool {
    fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open(path)
        .is_ok()
}

/// Check if current user is in the i2c group
fn is_in_i2c_group() -> bool {
    #[cfg(unix)]
    {
        use std::process::Command;

        match Command::new("groups").output() {
            Ok(output) => match String::from_utf8(output.stdout) {
                Ok(groups_str) => {
                    debug!("Groups output: '{}'", groups_str.trim());
                    return groups_str.split_whitespace().any(|g| g == "i2c");
                }
                Err(e) => {
                    debug!("Failed to parse groups output: {}", e);
                }
            },
            Err(e) => {
                debug!("Failed to run groups command: {}", e);
            }
        }
    }

    false
}
