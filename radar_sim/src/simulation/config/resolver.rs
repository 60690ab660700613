// radar_sim/src/simulation/config/resolver.rs

use super::catalog::PrefabCatalog;
use crate::simulation::core::ScenarioError;
use figment::value::{Dict, Tag, Value};

/// Prefab chains deeper than this are treated as a cycle.
const MAX_PREFAB_DEPTH: usize = 32;

/// Resolves every `from = "<prefab>"` reference inside `value`.
pub fn resolve_value(value: &Value, catalog: &PrefabCatalog) -> Result<Value, ScenarioError> {
    resolve_value_recursively(value, catalog, &mut Vec::new())
}

/// Merges `override_dict` into `base`. Nested tables merge key by key; a
/// nested table carrying its own `from` replaces the base entry outright.
fn deep_merge(base: &mut Dict, override_dict: &Dict) {
    for (key, override_val) in override_dict {
        if key == "from" {
            continue;
        }
        if let Some(d) = override_val.as_dict() {
            if d.contains_key("from") {
                base.insert(key.clone(), override_val.clone());
                continue;
            }
        }

        if let Some(base_val) = base.get_mut(key) {
            if let (Some(base_sub_dict), Some(override_sub_dict)) =
                (base_val.as_dict(), override_val.as_dict())
            {
                let mut new_sub_dict = base_sub_dict.clone();
                deep_merge(&mut new_sub_dict, override_sub_dict);
                *base_val = Value::Dict(Tag::Default, new_sub_dict);
                continue;
            }
        }
        base.insert(key.clone(), override_val.clone());
    }
}

fn resolve_value_recursively(
    value: &Value,
    catalog: &PrefabCatalog,
    chain: &mut Vec<String>,
) -> Result<Value, ScenarioError> {
    // Resolve this node first, then its children.
    let current_node = match value.as_dict() {
        Some(dict) => match dict.get("from").and_then(|v| v.as_str()) {
            Some(from_key) => {
                if chain.len() >= MAX_PREFAB_DEPTH || chain.iter().any(|k| k == from_key) {
                    return Err(ScenarioError::PrefabCycle(from_key.to_string()));
                }
                let base_prefab_data = catalog
                    .get(from_key)
                    .ok_or_else(|| ScenarioError::PrefabNotFound(from_key.to_string()))?;

                chain.push(from_key.to_string());
                let resolved_base = resolve_value_recursively(base_prefab_data, catalog, chain)?;
                chain.pop();

                let mut final_dict = resolved_base
                    .into_dict()
                    .ok_or_else(|| ScenarioError::PrefabNotTable(from_key.to_string()))?;
                deep_merge(&mut final_dict, dict);
                Value::Dict(Tag::Default, final_dict)
            }
            None => value.clone(),
        },
        None => value.clone(),
    };

    match &current_node {
        Value::Dict(tag, dict) => {
            let mut new_dict = Dict::new();
            for (key, val) in dict.iter() {
                if key == "from" {
                    continue;
                }
                new_dict.insert(key.clone(), resolve_value_recursively(val, catalog, chain)?);
            }
            Ok(Value::Dict(*tag, new_dict))
        }
        Value::Array(tag, arr) => {
            let resolved = arr
                .iter()
                .map(|item| resolve_value_recursively(item, catalog, chain))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Array(*tag, resolved))
        }
        _ => Ok(current_node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::{
        providers::{Format, Toml},
        Figment,
    };

    fn parse(toml: &str) -> Value {
        Figment::new().merge(Toml::string(toml)).extract().unwrap()
    }

    fn catalog() -> PrefabCatalog {
        let mut catalog = PrefabCatalog::default();
        catalog.0.insert(
            "radars.generic".into(),
            parse(
                r#"
                [radar]
                device_id = 1
                period_s = 0.07
                mode = "Object"
                "#,
            ),
        );
        catalog.0.insert(
            "radars.cluster".into(),
            parse(
                r#"
                from = "radars.generic"
                [radar]
                mode = "Cluster"
                "#,
            ),
        );
        catalog.0.insert("loop.a".into(), parse(r#"from = "loop.b""#));
        catalog.0.insert("loop.b".into(), parse(r#"from = "loop.a""#));
        catalog
    }

    fn get<'a>(value: &'a Value, path: &[&str]) -> &'a Value {
        path.iter().fold(value, |v, key| {
            v.as_dict().and_then(|d| d.get(*key)).unwrap()
        })
    }

    #[test]
    fn overrides_merge_into_nested_tables() {
        let entry = parse(
            r#"
            from = "radars.generic"
            name = "front"
            [radar]
            device_id = 9
            "#,
        );
        let resolved = resolve_value(&entry, &catalog()).unwrap();
        let dict = resolved.as_dict().unwrap();
        assert!(!dict.contains_key("from"));
        assert_eq!(get(&resolved, &["name"]).as_str(), Some("front"));
        assert_eq!(get(&resolved, &["radar", "device_id"]).to_i128(), Some(9));
        assert_eq!(get(&resolved, &["radar", "mode"]).as_str(), Some("Object"));
    }

    #[test]
    fn prefabs_can_build_on_prefabs() {
        let entry = parse(r#"from = "radars.cluster""#);
        let resolved = resolve_value(&entry, &catalog()).unwrap();
        assert_eq!(get(&resolved, &["radar", "mode"]).as_str(), Some("Cluster"));
        assert_eq!(get(&resolved, &["radar", "device_id"]).to_i128(), Some(1));
    }

    #[test]
    fn unknown_and_cyclic_prefabs_are_errors() {
        let missing = parse(r#"from = "radars.nope""#);
        assert!(matches!(
            resolve_value(&missing, &catalog()),
            Err(ScenarioError::PrefabNotFound(key)) if key == "radars.nope"
        ));

        let cyclic = parse(r#"from = "loop.a""#);
        assert!(matches!(
            resolve_value(&cyclic, &catalog()),
            Err(ScenarioError::PrefabCycle(_))
        ));
    }
}
