use super::{OverrideSpec, PermValue, PermissionMap, Preferences, Preset};

/// Inputs to [`resolve_permissions`] for one agent.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResolveInput<'a> {
    /// Permissions already present in the agent file, when known.
    pub built_in: Option<&'a PermissionMap>,
    pub saved: Option<&'a Preferences>,
    pub cli_preset: Option<Preset>,
    pub cli_yolo: bool,
    pub cli_overrides: &'a [OverrideSpec],
    pub agent: &'a str,
}

fn apply(map: &mut PermissionMap, overrides: &[OverrideSpec], agent: &str) {
    for o in overrides.iter().filter(|o| o.applies_to(agent)) {
        map.insert(o.permission, PermValue::Flat(o.action));
    }
}

/// Final permissions for an agent, highest precedence first:
/// CLI overrides, CLI preset (`--yolo` wins over `--permissions`), saved
/// preferences (preset, then its overrides), the file's own permissions.
///
/// `None` means no layer asked for a change and the file is left as is.
pub fn resolve_permissions(input: &ResolveInput<'_>) -> Option<PermissionMap> {
    let mut result: Option<PermissionMap> = None;

    if let Some(saved) = input.saved {
        result = saved.preset.map(Preset::permissions);
        if !saved.overrides.is_empty() {
            // Saved overrides need a base to land on.
            if result.is_none() {
                result = input.built_in.cloned();
            }
            if let Some(map) = result.as_mut() {
                apply(map, &saved.overrides, input.agent);
            }
        }
    }

    if input.cli_yolo {
        result = Some(Preset::Yolo.permissions());
    } else if let Some(preset) = input.cli_preset {
        result = Some(preset.permissions());
    }

    if !input.cli_overrides.is_empty() {
        let map = result.get_or_insert_with(|| input.built_in.cloned().unwrap_or_default());
        apply(map, input.cli_overrides, input.agent);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::super::{PermAction, Permission};
    use super::*;

    fn ov(agent: Option<&str>, permission: Permission, action: PermAction) -> OverrideSpec {
        OverrideSpec {
            agent: agent.map(str::to_string),
            permission,
            action,
        }
    }

    #[test]
    fn nothing_requested_means_none() {
        assert_eq!(
            resolve_permissions(&ResolveInput {
                agent: "a",
                ..Default::default()
            }),
            None
        );
    }

    #[test]
    fn cli_preset_beats_saved_preset() {
        let saved = Preferences {
            preset: Some(Preset::Strict),
            overrides: Vec::new(),
        };
        let out = resolve_permissions(&ResolveInput {
            saved: Some(&saved),
            cli_preset: Some(Preset::Permissive),
            agent: "a",
            ..Default::default()
        })
        .unwrap();
        assert_eq!(out, Preset::Permissive.permissions());
    }

    #[test]
    fn yolo_beats_cli_preset() {
        let out = resolve_permissions(&ResolveInput {
            cli_preset: Some(Preset::Strict),
            cli_yolo: true,
            agent: "a",
            ..Default::default()
        })
        .unwrap();
        assert_eq!(out, Preset::Yolo.permissions());
    }

    #[test]
    fn cli_overrides_apply_last_and_respect_scope() {
        let overrides = [
            ov(None, Permission::Bash, PermAction::Deny),
            ov(Some("other"), Permission::Read, PermAction::Deny),
        ];
        let out = resolve_permissions(&ResolveInput {
            cli_preset: Some(Preset::Balanced),
            cli_overrides: &overrides,
            agent: "a",
            ..Default::default()
        })
        .unwrap();
        assert_eq!(out[&Permission::Bash], PermValue::Flat(PermAction::Deny));
        assert_eq!(out[&Permission::Read], PermValue::Flat(PermAction::Allow));
    }

    #[test]
    fn overrides_without_base_build_partial_map() {
        let overrides = [ov(None, Permission::Write, PermAction::Ask)];
        let out = resolve_permissions(&ResolveInput {
            cli_overrides: &overrides,
            agent: "a",
            ..Default::default()
        })
        .unwrap();
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn saved_overrides_without_base_are_skipped() {
        let saved = Preferences {
            preset: None,
            overrides: vec![ov(None, Permission::Write, PermAction::Ask)],
        };
        assert_eq!(
            resolve_permissions(&ResolveInput {
                saved: Some(&saved),
                agent: "a",
                ..Default::default()
            }),
            None
        );
    }
}
