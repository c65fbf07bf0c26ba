use anyhow::{anyhow, bail, Context};
use cdc_envelope::kafka::{ChangeEmitter, KafkaPublisher};
use cdc_envelope::schema::{self, Schema, SchemaType, TableSchema};
use cdc_envelope::time::{micro_time, micro_timestamp};
use cdc_envelope::{assemble, Config, Operation, Row, SourceMetadata, Value};
use chrono::{NaiveDateTime, NaiveTime, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "cdc-envelope")]
#[command(about = "Build and publish Debezium-compatible change events", long_about = None)]
struct Args {
    #[arg(short, long, help = "Enable JSON output for logs")]
    json_logs: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the envelope schema for a table
    Schema {
        #[arg(long)]
        table: String,

        /// Column as name:type, type suffixed with '?' when optional
        #[arg(long = "column", value_name = "NAME:TYPE", required = true)]
        columns: Vec<String>,
    },

    /// Build one change event and publish it
    Emit {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,

        #[arg(long)]
        table: String,

        #[arg(long = "column", value_name = "NAME:TYPE", required = true)]
        columns: Vec<String>,

        /// Key column name, repeatable
        #[arg(long = "key")]
        keys: Vec<String>,

        /// Operation code: c, u, d or r
        #[arg(long, default_value = "c")]
        op: Operation,

        /// Before-image value as name=value, repeatable
        #[arg(long = "before", value_name = "NAME=VALUE")]
        before: Vec<String>,

        /// After-image value as name=value, repeatable
        #[arg(long = "after", value_name = "NAME=VALUE")]
        after: Vec<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs, args.verbose);

    match args.command {
        Command::Schema { table, columns } => {
            let columns = parse_columns(&columns)?;
            let envelope = schema::envelope_schema(&table, columns);
            println!("{}", serde_json::to_string_pretty(&envelope)?);
        }
        Command::Emit {
            config,
            table,
            columns,
            keys,
            op,
            before,
            after,
        } => {
            info!("Loading configuration from {:?}", config);
            let config = Config::from_file(&config)
                .with_context(|| format!("loading configuration from {:?}", config))?;

            let columns = parse_columns(&columns)?;
            let key_fields = keys
                .iter()
                .map(|key| {
                    columns
                        .iter()
                        .find(|c| c.field.as_deref() == Some(key.as_str()))
                        .cloned()
                        .ok_or_else(|| anyhow!("key column '{}' is not a declared column", key))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            let table_schema = TableSchema::new(table.clone(), key_fields, columns);

            let before = build_image(table_schema.columns(), &before)?;
            let after = build_image(table_schema.columns(), &after)?;
            let key_source = match op {
                Operation::Delete => before.as_ref(),
                _ => after.as_ref(),
            };
            let key = build_key(table_schema.key().children(), key_source);

            let (db, table_name) = table.rsplit_once('.').unwrap_or(("", table.as_str()));
            let now = Utc::now();
            let source = SourceMetadata::new(
                config.kafka.topic.clone(),
                0,
                now.timestamp(),
                db.to_string(),
                table_name.to_string(),
            );
            let envelope = assemble(before, after, source, op, now.timestamp_millis());

            let publisher = KafkaPublisher::new(&config.kafka)?;
            let emitter = ChangeEmitter::new(publisher, config.kafka.converter)?;
            let topic = config.kafka.topic_name(&table);

            match emitter.emit(&topic, &table_schema, &key, &envelope) {
                Ok(receipt) => {
                    info!(
                        topic = %topic,
                        partition = receipt.partition,
                        offset = receipt.offset,
                        "Change event delivered"
                    );
                    println!("{} {} {}", topic, receipt.partition, receipt.offset);
                }
                Err(e) => {
                    error!("Failed to emit change event: {}", e);
                    return Err(e.into());
                }
            }
        }
    }

    Ok(())
}

/// Parses `name:type` column declarations into schema fields.
fn parse_columns(decls: &[String]) -> anyhow::Result<Vec<Schema>> {
    decls.iter().map(|decl| parse_column(decl)).collect()
}

fn parse_column(decl: &str) -> anyhow::Result<Schema> {
    let (name, ty) = decl
        .split_once(':')
        .ok_or_else(|| anyhow!("column '{}' must be NAME:TYPE", decl))?;
    let (ty, optional) = match ty.strip_suffix('?') {
        Some(ty) => (ty, true),
        None => (ty, false),
    };

    let schema = match ty {
        "string" => schema::simple_field(SchemaType::String, optional, name),
        "int64" => schema::simple_field(SchemaType::Int64, optional, name),
        "int32" => schema::simple_field(SchemaType::Int32, optional, name),
        "int16" => schema::simple_field(SchemaType::Int16, optional, name),
        "int8" => schema::simple_field(SchemaType::Int8, optional, name),
        "bytes" => schema::simple_field(SchemaType::Bytes, optional, name),
        "float64" => schema::simple_field(SchemaType::Float64, optional, name),
        "float32" => schema::simple_field(SchemaType::Float32, optional, name),
        "boolean" => schema::simple_field(SchemaType::Boolean, optional, name),
        "json" => schema::json_field(optional, name),
        "time" => schema::time_field(optional, name),
        "timestamp" => schema::timestamp_field(optional, name),
        other => {
            let args = other
                .strip_prefix("decimal(")
                .and_then(|rest| rest.strip_suffix(')'))
                .ok_or_else(|| anyhow!("unknown column type '{}'", other))?;
            let (precision, scale) = args
                .split_once(',')
                .ok_or_else(|| anyhow!("decimal needs precision and scale: '{}'", other))?;
            schema::decimal_field(precision.trim().parse()?, scale.trim().parse()?, optional, name)
        }
    };
    Ok(schema)
}

/// Builds a row image in schema column order. Returns `None` when no values were given.
fn build_image(columns: &[Schema], assignments: &[String]) -> anyhow::Result<Option<Row>> {
    if assignments.is_empty() {
        return Ok(None);
    }

    let mut given = Vec::with_capacity(assignments.len());
    for assignment in assignments {
        let (name, text) = assignment
            .split_once('=')
            .ok_or_else(|| anyhow!("value '{}' must be NAME=VALUE", assignment))?;
        if !columns.iter().any(|c| c.field.as_deref() == Some(name)) {
            bail!("'{}' is not a declared column", name);
        }
        given.push((name, text));
    }

    let mut row = Row::with_capacity(columns.len());
    for column in columns {
        let name = column.field.as_deref().unwrap_or_default();
        let value = match given.iter().rev().find(|(n, _)| *n == name) {
            Some((_, text)) => parse_value(column, text)
                .with_context(|| format!("parsing value for column '{}'", name))?,
            None => Value::Null,
        };
        row.append(name, value);
    }
    Ok(Some(row))
}

fn build_key(key_fields: &[Schema], image: Option<&Row>) -> Row {
    let mut key = Row::with_capacity(key_fields.len());
    for field in key_fields {
        let name = field.field.as_deref().unwrap_or_default();
        let value = image
            .and_then(|row| row.iter().find(|(n, _)| *n == name))
            .map(|(_, v)| v.clone())
            .unwrap_or(Value::Null);
        key.append(name, value);
    }
    key
}

fn parse_value(column: &Schema, text: &str) -> anyhow::Result<Value> {
    if text == "null" && column.optional {
        return Ok(Value::Null);
    }

    let value = match (column.schema_type, column.name.as_deref()) {
        (SchemaType::Int64, Some(schema::MICRO_TIME_LOGICAL_NAME)) => {
            Value::Int64(micro_time(&NaiveTime::parse_from_str(text, "%H:%M:%S%.f")?))
        }
        (SchemaType::Int64, Some(schema::MICRO_TIMESTAMP_LOGICAL_NAME)) => {
            let ts = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f")
                .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f"))?;
            Value::Int64(micro_timestamp(&ts))
        }
        (SchemaType::Bytes, Some(schema::DECIMAL_LOGICAL_NAME)) => {
            let scale = column
                .parameters
                .as_ref()
                .and_then(|p| p.get(schema::DECIMAL_SCALE_PARAM))
                .map(|s| s.parse::<usize>())
                .transpose()?
                .unwrap_or(0);
            Value::decimal(parse_unscaled(text, scale)?)
        }
        (SchemaType::String, _) => Value::String(text.to_string()),
        (SchemaType::Int64, _) => Value::Int64(text.parse()?),
        (SchemaType::Int32, _) => Value::Int32(text.parse()?),
        (SchemaType::Int16, _) => Value::Int16(text.parse()?),
        (SchemaType::Int8, _) => Value::Int8(text.parse()?),
        (SchemaType::Float64, _) => Value::Float64(text.parse()?),
        (SchemaType::Float32, _) => Value::Float32(text.parse()?),
        (SchemaType::Boolean, _) => Value::Boolean(text.parse()?),
        (SchemaType::Bytes, _) => Value::from(text.as_bytes().to_vec()),
        (SchemaType::Struct, _) => bail!("struct columns cannot be given on the command line"),
    };
    Ok(value)
}

/// Parses decimal text such as `-12.5` into its unscaled integer at `scale`.
fn parse_unscaled(text: &str, scale: usize) -> anyhow::Result<i128> {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    if frac_part.len() > scale {
        bail!("'{}' has more than {} fractional digits", text, scale);
    }
    let digits = format!("{}{}{}", int_part, frac_part, "0".repeat(scale - frac_part.len()));
    Ok(digits.parse()?)
}

fn init_logging(json: bool, verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("cdc_envelope=trace,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("cdc_envelope=info,warn"))
    };

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(false)
            .with_span_list(false)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_types() {
        let amount = parse_column("amount:decimal(10,2)?").unwrap();
        assert_eq!(amount.name.as_deref(), Some(schema::DECIMAL_LOGICAL_NAME));
        assert!(amount.optional);

        let id = parse_column("id:int64").unwrap();
        assert_eq!(id.schema_type, SchemaType::Int64);
        assert!(!id.optional);

        assert!(parse_column("id").is_err());
        assert!(parse_column("id:uuid").is_err());
    }

    #[test]
    fn test_build_image_uses_schema_order() {
        let columns = parse_columns(&["a:int32".to_string(), "b:string?".to_string()]).unwrap();
        let row = build_image(&columns, &["b=x".to_string(), "a=1".to_string()])
            .unwrap()
            .unwrap();

        let names: Vec<&str> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(row.values(), &[Value::Int32(1), Value::String("x".to_string())]);
        assert!(build_image(&columns, &[]).unwrap().is_none());
        assert!(build_image(&columns, &["c=1".to_string()]).is_err());
    }

    #[test]
    fn test_parse_logical_values() {
        let price = parse_column("price:decimal(6,2)").unwrap();
        assert_eq!(parse_value(&price, "12.3").unwrap(), Value::decimal(1230));
        assert!(parse_value(&price, "1.234").is_err());

        let at = parse_column("at:time").unwrap();
        assert_eq!(parse_value(&at, "00:00:01.5").unwrap(), Value::Int64(1_500_000));

        let created = parse_column("created:timestamp").unwrap();
        assert_eq!(parse_value(&created, "1970-01-01T00:00:01").unwrap(), Value::Int64(1_000_000));
    }

    #[test]
    fn test_build_key_from_image() {
        let image = Row::new().with("id", 5i64).with("name", "n");
        let key_fields = vec![schema::simple_field(SchemaType::Int64, false, "id")];
        let key = build_key(&key_fields, Some(&image));
        assert_eq!(key, Row::new().with("id", 5i64));

        let missing = build_key(&key_fields, None);
        assert_eq!(missing.values(), &[Value::Null]);
    }
}
