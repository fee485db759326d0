/// Lifecycle events fired by the dependency manager around install/update runs.
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::UnknownEventError;

/// Script events a plugin may subscribe to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptEvent {
    PreInstallCmd,
    PostInstallCmd,
    PreUpdateCmd,
    PostUpdateCmd,
    PreAutoloadDump,
    PostAutoloadDump,
    PostRootPackageInstall,
    PostCreateProjectCmd,
}

impl ScriptEvent {
    pub const ALL: [ScriptEvent; 8] = [
        ScriptEvent::PreInstallCmd,
        ScriptEvent::PostInstallCmd,
        ScriptEvent::PreUpdateCmd,
        ScriptEvent::PostUpdateCmd,
        ScriptEvent::PreAutoloadDump,
        ScriptEvent::PostAutoloadDump,
        ScriptEvent::PostRootPackageInstall,
        ScriptEvent::PostCreateProjectCmd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ScriptEvent::PreInstallCmd => "pre-install-cmd",
            ScriptEvent::PostInstallCmd => "post-install-cmd",
            ScriptEvent::PreUpdateCmd => "pre-update-cmd",
            ScriptEvent::PostUpdateCmd => "post-update-cmd",
            ScriptEvent::PreAutoloadDump => "pre-autoload-dump",
            ScriptEvent::PostAutoloadDump => "post-autoload-dump",
            ScriptEvent::PostRootPackageInstall => "post-root-package-install",
            ScriptEvent::PostCreateProjectCmd => "post-create-project-cmd",
        }
    }
}

impl std::fmt::Display for ScriptEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScriptEvent {
    type Err = UnknownEventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        ScriptEvent::ALL
            .into_iter()
            .find(|event| event.as_str() == name)
            .ok_or_else(|| UnknownEventError(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_post_update() {
        let event: ScriptEvent = "post-update-cmd".parse().unwrap();
        assert_eq!(event, ScriptEvent::PostUpdateCmd);
        assert_eq!(event.to_string(), "post-update-cmd");
    }

    #[test]
    fn test_names_match_serde() {
        for event in ScriptEvent::ALL {
            let json = serde_json::to_string(&event).unwrap();
            assert_eq!(json, format!("\"{}\"", event.as_str()));
        }
    }

    #[test]
    fn test_unknown_event() {
        let err = "post-deploy".parse::<ScriptEvent>().unwrap_err();
        assert_eq!(err, UnknownEventError("post-deploy".into()));
    }
}
