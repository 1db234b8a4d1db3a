//! Fetch the appliance configuration tree and look up key paths in it.
//!
//! Every call renders a fresh dump script, runs it through the interpreter,
//! and decodes stdout. Nothing is cached between calls.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::key_path::resolve_path;
use crate::core::script::{DEFAULT_INCLUDES, Script};
use crate::core::types::ConfigTree;
use crate::error::ConfigError;
use crate::io::interpreter::Interpreter;

/// PHP statement that prints `$config` as pretty-printed JSON.
pub const DUMP_CONFIG_PHP: &str = "print_r(json_encode($config, $options=JSON_PRETTY_PRINT));";

/// Resolves configuration lookups against a live interpreter.
#[derive(Debug, Clone)]
pub struct ConfigResolver<I> {
    interpreter: I,
    includes: Vec<String>,
}

impl<I: Interpreter> ConfigResolver<I> {
    /// Create a resolver whose scripts use [`DEFAULT_INCLUDES`].
    pub fn new(interpreter: I) -> Self {
        Self::with_includes(interpreter, DEFAULT_INCLUDES.iter().map(|s| s.to_string()))
    }

    pub fn with_includes(interpreter: I, includes: impl IntoIterator<Item = String>) -> Self {
        Self {
            interpreter,
            includes: includes.into_iter().collect(),
        }
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    /// Script used to dump the configuration.
    pub fn dump_script(&self) -> Script {
        Script::with_includes(self.includes.iter().cloned(), [DUMP_CONFIG_PHP])
    }

    /// Fetch the config and return the subtree at `key_path`.
    ///
    /// `None` or an empty path returns the whole tree. `Ok(None)` means the
    /// path did not match; interpreter and decode failures are errors.
    #[instrument(skip(self))]
    pub fn get(&self, key_path: Option<&str>) -> Result<Option<ConfigTree>, ConfigError> {
        let result = self.interpreter.run(&self.dump_script())?;
        if result.stdout_truncated > 0 {
            return Err(ConfigError::Truncated {
                discarded: result.stdout_truncated,
            });
        }
        let tree = decode_config(&result.stdout, &result.stderr)?;
        let found = resolve_path(tree, key_path);
        if found.is_none() {
            debug!("key path matched nothing");
        }
        Ok(found)
    }

    /// Like [`ConfigResolver::get`], for callers that pass loosely typed arguments.
    ///
    /// Accepts zero arguments or a single string.
    pub fn get_from_args(&self, args: &[Value]) -> Result<Option<ConfigTree>, ConfigError> {
        let key_path = key_path_from_args(args)?;
        self.get(key_path)
    }
}

/// Validate a dynamic argument list and extract the optional key path.
pub fn key_path_from_args(args: &[Value]) -> Result<Option<&str>, ConfigError> {
    match args {
        [] => Ok(None),
        [Value::String(path)] => Ok(Some(path.as_str())),
        [other] => Err(ConfigError::InvalidArgument(format!(
            "key path must be a string, got {other}"
        ))),
        _ => Err(ConfigError::InvalidArgument(format!(
            "expected at most one key path argument, got {}",
            args.len()
        ))),
    }
}

/// Decode interpreter stdout into a [`ConfigTree`].
///
/// `stderr` is attached to the error so interpreter-side failures (parse
/// errors, missing includes) stay visible.
pub fn decode_config(stdout: &str, stderr: &str) -> Result<ConfigTree, ConfigError> {
    serde_json::from_str(stdout).map_err(|source| ConfigError::Decode {
        source,
        stderr: stderr.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::types::ExecutionResult;
    use crate::test_support::ScriptedInterpreter;

    fn resolver_with(stdout: &str) -> ConfigResolver<ScriptedInterpreter> {
        ConfigResolver::new(ScriptedInterpreter::new(vec![ExecutionResult::new(stdout, "")]))
    }

    #[test]
    fn dump_script_uses_default_includes() {
        let resolver = resolver_with("{}");
        assert_eq!(
            resolver.dump_script().render(),
            "<?php\nrequire_once(\"globals.inc\");\nrequire_once(\"functions.inc\");\n\
             require_once(\"config.inc\");\nrequire_once(\"util.inc\");\
             print_r(json_encode($config, $options=JSON_PRETTY_PRINT));\n?>"
        );
    }

    #[test]
    fn get_without_path_returns_full_tree() {
        let resolver = resolver_with("{\"a\":{\"b\":1}}");
        assert_eq!(resolver.get(None).expect("get"), Some(json!({"a": {"b": 1}})));
    }

    #[test]
    fn get_walks_key_path() {
        let resolver = resolver_with("{\"a\":{\"b\":{\"c\":42}}}");
        assert_eq!(resolver.get(Some("a:b:c")).expect("get"), Some(json!(42)));
    }

    #[test]
    fn get_reports_miss_as_none() {
        let resolver = resolver_with("{\"a\":{\"b\":{\"c\":42}}}");
        assert_eq!(resolver.get(Some("a:z:c")).expect("get"), None);
    }

    #[test]
    fn every_call_runs_the_interpreter() {
        let interpreter = ScriptedInterpreter::new(vec![
            ExecutionResult::new("{\"rev\":1}", ""),
            ExecutionResult::new("{\"rev\":2}", ""),
        ]);
        let resolver = ConfigResolver::new(&interpreter);
        assert_eq!(resolver.get(Some("rev")).expect("first"), Some(json!(1)));
        assert_eq!(resolver.get(Some("rev")).expect("second"), Some(json!(2)));
        assert_eq!(interpreter.scripts().len(), 2);
    }

    #[test]
    fn non_json_output_is_a_decode_error() {
        let interpreter = ScriptedInterpreter::new(vec![ExecutionResult::new(
            "PHP Fatal error: require_once(): Failed opening required 'config.inc'",
            "missing include",
        )]);
        let resolver = ConfigResolver::new(interpreter);
        let err = resolver.get(None).expect_err("decode fails");
        assert!(matches!(err, ConfigError::Decode { .. }));
        assert_eq!(err.stderr(), Some("missing include"));
    }

    #[test]
    fn interpreter_failure_propagates_unchanged() {
        let resolver = ConfigResolver::new(ScriptedInterpreter::new(Vec::new()));
        let err = resolver.get(Some("system")).expect_err("no result queued");
        assert!(matches!(err, ConfigError::Communication { .. }));
    }

    #[test]
    fn clipped_output_is_reported_as_truncated() {
        let interpreter = ScriptedInterpreter::new(vec![ExecutionResult {
            stdout_truncated: 4096,
            ..ExecutionResult::new("{\"interfaces\":{\"wan\"", "")
        }]);
        let err = ConfigResolver::new(interpreter)
            .get(None)
            .expect_err("truncated");
        assert!(matches!(err, ConfigError::Truncated { discarded: 4096 }));
    }

    #[test]
    fn empty_output_is_a_decode_error() {
        let err = resolver_with("").get(None).expect_err("decode fails");
        assert!(matches!(err, ConfigError::Decode { .. }));
    }

    #[test]
    fn two_arguments_are_rejected() {
        let err = resolver_with("{}")
            .get_from_args(&[json!("a"), json!("b")])
            .expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }

    #[test]
    fn non_string_argument_is_rejected() {
        let err = key_path_from_args(&[json!(7)]).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidArgument(_)));
    }

    #[test]
    fn invalid_arguments_do_not_run_the_interpreter() {
        let interpreter = ScriptedInterpreter::new(Vec::new());
        let resolver = ConfigResolver::new(&interpreter);
        assert!(resolver.get_from_args(&[json!(["a"])]).is_err());
        assert!(interpreter.scripts().is_empty());
    }

    #[test]
    fn single_string_argument_is_used_as_path() {
        let resolver = resolver_with("{\"system\":{\"hostname\":\"fw\"}}");
        assert_eq!(
            resolver
                .get_from_args(&[json!("system:hostname")])
                .expect("get"),
            Some(json!("fw"))
        );
    }
}
