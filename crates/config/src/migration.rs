use std::path::Path;
use std::sync::Arc;
use toml_edit::{Array, DocumentMut, Item, Table, Value};

/// Migrates config file to latest format if needed
pub async fn migrate_config_if_needed<P: AsRef<Path>>(
    path: P,
    events: Option<&Arc<diskfile_events::EventBus>>,
) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    let mut doc = content.parse::<DocumentMut>()?;
    let added_fields = migrate_document(&mut doc)?;

    // Only write if we added fields
    if !added_fields.is_empty() {
        tokio::fs::write(path.as_ref(), doc.to_string()).await?;

        if let Some(event_bus) = events {
            event_bus.emit(diskfile_events::AppEvent::ConfigMigrated {
                added_fields: added_fields.clone(),
            });
        }
    }

    Ok(())
}

fn migrate_document(doc: &mut DocumentMut) -> anyhow::Result<Vec<String>> {
    let mut added_fields = Vec::new();

    migrate_server_section(doc, &mut added_fields)?;
    migrate_signing_section(doc, &mut added_fields)?;
    migrate_temp_section(doc, &mut added_fields)?;

    Ok(added_fields)
}

fn migrate_server_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc, "server", added_fields);

    let server = doc["server"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [server] section in config"))?;
    ensure_field(server, "host", Value::from("0.0.0.0"), added_fields);
    ensure_field(server, "port", Value::from(8080), added_fields);
    ensure_field(
        server,
        "base_url",
        Value::from("http://localhost:8080"),
        added_fields,
    );
    ensure_field(server, "tcp_nodelay", Value::from(true), added_fields);
    ensure_field(server, "timeout_secs", Value::from(60), added_fields);
    ensure_field(
        server,
        "enable_compression",
        Value::from(false),
        added_fields,
    );

    if !server.contains_key("allowed_origins") {
        let mut arr = Array::new();
        arr.push("*");
        server["allowed_origins"] = Item::Value(Value::Array(arr));
        added_fields.push("server.allowed_origins".to_string());
    }

    Ok(())
}

fn migrate_signing_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc, "signing", added_fields);

    let signing = doc["signing"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [signing] section in config"))?;

    // A missing secret gets a fresh one; an empty one is left for validation to reject
    if !signing.contains_key("secret") {
        signing["secret"] = Item::Value(Value::from(super::defaults::generate_secret()));
        added_fields.push("signing.secret".to_string());
    }
    ensure_field(
        signing,
        "default_expiration_secs",
        Value::from(3600),
        added_fields,
    );

    Ok(())
}

fn migrate_temp_section(
    doc: &mut DocumentMut,
    added_fields: &mut Vec<String>,
) -> anyhow::Result<()> {
    ensure_table(doc, "temp", added_fields);

    let temp = doc["temp"]
        .as_table_mut()
        .ok_or_else(|| anyhow::anyhow!("Invalid [temp] section in config"))?;
    ensure_field(temp, "max_age_hours", Value::from(24), added_fields);
    ensure_field(temp, "sweep_interval_secs", Value::from(3600), added_fields);

    Ok(())
}

fn ensure_table(doc: &mut DocumentMut, key: &str, added_fields: &mut Vec<String>) {
    if !doc.contains_key(key) {
        let mut table = Table::new();
        table.set_implicit(true);
        doc[key] = Item::Table(table);
        added_fields.push(key.to_string());
    }
}

fn ensure_field(
    table: &mut Table,
    key: &str,
    default_value: Value,
    added_fields: &mut Vec<String>,
) {
    if !table.contains_key(key) {
        table[key] = Item::Value(default_value);
        added_fields.push(key.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adds_missing_sections() {
        let mut doc = r#"
[server]
host = "127.0.0.1"
port = 9000
base_url = "http://files.test"
"#
        .parse::<DocumentMut>()
        .unwrap();

        let added = migrate_document(&mut doc).unwrap();

        assert!(added.contains(&"signing".to_string()));
        assert!(added.contains(&"signing.secret".to_string()));
        assert!(added.contains(&"temp".to_string()));
        assert_eq!(doc["server"]["port"].as_integer(), Some(9000));
        assert_eq!(doc["signing"]["default_expiration_secs"].as_integer(), Some(3600));
        assert_eq!(doc["temp"]["max_age_hours"].as_integer(), Some(24));
    }

    #[test]
    fn test_complete_document_is_untouched() {
        let text = crate::defaults::DEFAULT_CONFIG_TEMPLATE.replace("{secret}", "abc");
        let mut doc = text.parse::<DocumentMut>().unwrap();

        let added = migrate_document(&mut doc).unwrap();

        assert!(added.is_empty(), "unexpected additions: {:?}", added);
        assert_eq!(doc["signing"]["secret"].as_str(), Some("abc"));
    }
}
