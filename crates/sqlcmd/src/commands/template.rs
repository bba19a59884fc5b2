//! Tera expansion of command files before they are parsed.
//!
//! Command files may use `{{ var }}` for values given with `-v var=value`
//! and `{{ env(name="VAR", default="x") }}` for environment variables.
//! `${Property}` tokens are untouched here; they are expanded per command
//! when it runs.

use std::collections::{BTreeMap, HashMap};
use tera::{Context, Tera, Value};

pub fn expand_template(text: &str, vars: &BTreeMap<String, String>) -> Result<String, tera::Error> {
    let mut tera = Tera::default();
    tera.register_function("env", env_function);

    let mut context = Context::new();
    for (key, value) in vars {
        context.insert(key, value);
    }
    tera.render_str(text, &context)
}

fn env_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = args
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("env function requires 'name' parameter"))?;
    let default = args.get("default").and_then(Value::as_str);

    match std::env::var(name) {
        Ok(value) => Ok(Value::String(value)),
        Err(std::env::VarError::NotPresent) => default
            .map(|d| Value::String(d.to_string()))
            .ok_or_else(|| {
                tera::Error::msg(format!(
                    "environment variable '{name}' not set and no default provided"
                ))
            }),
        Err(e) => Err(tera::Error::msg(format!(
            "failed to read environment variable '{name}': {e}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables_expand() {
        let mut vars = BTreeMap::new();
        vars.insert("store".to_string(), "hydro".to_string());
        let text = expand_template("datastore: {{ store }}\nsql: SELECT ${Col}", &vars)
            .expect("renders");
        assert_eq!(text, "datastore: hydro\nsql: SELECT ${Col}");
    }

    #[test]
    fn test_env_default() {
        let text = expand_template(
            "{{ env(name='TSQL_TEMPLATE_TEST_UNSET', default='fallback') }}",
            &BTreeMap::new(),
        )
        .expect("renders");
        assert_eq!(text, "fallback");

        assert!(expand_template("{{ env(name='TSQL_TEMPLATE_TEST_UNSET') }}", &BTreeMap::new()).is_err());
    }

    #[test]
    fn test_missing_variable_fails() {
        assert!(expand_template("{{ nope }}", &BTreeMap::new()).is_err());
    }
}
