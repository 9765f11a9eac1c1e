//! Script hook discovery.

use std::fmt;

use serde_json::Value;
use tracing::error;

use super::{SyntaxChecker, SyntaxDiagnostic};
use crate::error::{SyncError, SyncResult};
use crate::model::{Script, ScriptLanguage};

/// Marker `type` of an embedded script hook.
pub const SCRIPT_HOOK_TYPE: &str = "text/javascript";

/// A hook whose source did not parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookFailure {
    /// JSON pointer to the hook object
    pub pointer: String,
    pub diagnostic: SyntaxDiagnostic,
}

impl fmt::Display for HookFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid script hook at {}: {}", self.pointer, self.diagnostic)
    }
}

/// `true` if every script hook in `value` either has no `source` or parses.
pub fn validate_script_hooks(value: &Value, checker: &dyn SyntaxChecker) -> bool {
    match first_invalid_hook(value, checker) {
        Some(failure) => {
            error!(%failure, "script hook validation failed");
            false
        }
        None => true,
    }
}

/// The first hook, in document order, whose source fails to parse.
///
/// Hooks are objects nested anywhere below `value` whose `type` is
/// `text/javascript`; a hook's own children are not searched. `value`
/// itself is never treated as a hook.
pub fn first_invalid_hook(value: &Value, checker: &dyn SyntaxChecker) -> Option<HookFailure> {
    let mut pointer = String::new();
    walk(value, checker, &mut pointer)
}

fn walk(value: &Value, checker: &dyn SyntaxChecker, pointer: &mut String) -> Option<HookFailure> {
    let children: Vec<(String, &Value)> = match value {
        Value::Object(map) => map.iter().map(|(k, v)| (escape(k), v)).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        _ => return None,
    };

    for (key, child) in children {
        if !(child.is_object() || child.is_array()) {
            continue;
        }
        let len = pointer.len();
        pointer.push('/');
        pointer.push_str(&key);

        let found = if is_hook(child) {
            check_hook(child, checker).map(|diagnostic| HookFailure {
                pointer: pointer.clone(),
                diagnostic,
            })
        } else {
            walk(child, checker, pointer)
        };

        pointer.truncate(len);
        if found.is_some() {
            return found;
        }
    }
    None
}

fn is_hook(value: &Value) -> bool {
    value.get("type").and_then(Value::as_str) == Some(SCRIPT_HOOK_TYPE)
}

fn check_hook(hook: &Value, checker: &dyn SyntaxChecker) -> Option<SyntaxDiagnostic> {
    // Only string sources are checked; a missing source is valid.
    let source = hook.get("source")?.as_str()?;
    checker.check(source).err()
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}

/// Check a script object. JavaScript bodies must parse; Groovy is accepted
/// as is.
pub fn validate_script(script: &Script, checker: &dyn SyntaxChecker) -> SyncResult<()> {
    if script.language != ScriptLanguage::Javascript {
        return Ok(());
    }
    let source = script.source()?;
    checker.check(&source).map_err(|diagnostic| {
        SyncError::Validation(format!(
            "invalid {} in script '{}': {diagnostic}",
            checker.language(),
            script.name
        ))
    })
}
