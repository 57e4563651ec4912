//! SSH command-line and cloud-init helpers.
//!
//! Pure functions only — no I/O.

use std::path::Path;

/// Login user on the instance images this tool launches.
pub const REMOTE_USER: &str = "root";

/// Arguments for the external `ssh` client.
///
/// Host-key checking is off and the known-hosts file is `/dev/null`: instances
/// are disposable and their addresses get reused.
#[must_use]
pub fn ssh_args(key_path: &Path, address: &str, extra: &[String]) -> Vec<String> {
    let mut args = vec![
        "-i".to_string(),
        key_path.display().to_string(),
        "-o".to_string(),
        "StrictHostKeyChecking=no".to_string(),
        "-o".to_string(),
        "UserKnownHostsFile=/dev/null".to_string(),
        format!("{REMOTE_USER}@{address}"),
    ];
    args.extend(extra.iter().cloned());
    args
}

/// Copy-pasteable connection hint printed after `create`.
#[must_use]
pub fn ssh_hint(key_path: &Path, address: Option<&str>) -> String {
    format!(
        "ssh -i {} {REMOTE_USER}@{}",
        key_path.display(),
        address.unwrap_or("<ip>")
    )
}

/// User-data script that appends `public_key` to root's authorized keys.
#[must_use]
pub fn startup_script(public_key: &str) -> String {
    let key = public_key.trim_end();
    format!(
        "#!/bin/bash\n\
         # Add public key to authorized_keys\n\
         mkdir -p /root/.ssh\n\
         echo \"{key}\" >> /root/.ssh/authorized_keys\n\
         chmod 600 /root/.ssh/authorized_keys\n\
         chmod 700 /root/.ssh\n"
    )
}
