//! `--config "<key> = <value>; ..."` overrides applied to the TOML document before it is
//! deserialized.

use std::{mem, path::Path};

use anyhow::{bail, Context as _, Result};
use toml::Value;
use toml_query::{delete::TomlValueDeleteExt, insert::TomlValueInsertExt, read::TomlValueReadExt};
use tracing::debug;

use crate::{AppConfig, Error};

const SEPARATORS: &[char] = &['\n', ';'];

#[derive(Debug, PartialEq)]
enum Override {
    /// `<key> = <value>`: replace or create the key.
    Set(String, Value),
    /// `<key> =`: remove the key, ignored if absent.
    Delete(String),
}

/// Applies the overrides in `scripts` to `doc`.
///
/// Scripts are separated by newlines or semicolons; separators inside string literals,
/// arrays and inline tables are kept.
pub fn apply(doc: &mut Value, scripts: &str) -> Result<()> {
    for script in parse(scripts)? {
        debug!(?script, "applying config override");
        match script {
            Override::Set(key, value) => {
                doc.insert(&key, value)?;
            }
            Override::Delete(key) => {
                if doc.read(&key)?.is_some() {
                    doc.delete(&key)?;
                }
            }
        }
    }
    Ok(())
}

/// Applies `scripts` on top of `doc` and parses the result as an [`AppConfig`].
///
/// `doc` is `None` when no config file was given; the defaults are used as the base.
pub fn apply_to_config<P: AsRef<Path>>(
    doc: Option<&str>,
    scripts: &str,
    path: P,
) -> Result<AppConfig, Error> {
    let path = path.as_ref();
    let base = match doc {
        Some(doc) => doc.to_owned(),
        None => AppConfig::default().to_toml()?,
    };
    let mut value: Value = toml::from_str(&base)
        .map_err(|e| Error::TomlParseFailure(path.to_owned(), e))?;
    apply(&mut value, scripts).map_err(|e| Error::InvalidOverride(scripts.to_owned(), e))?;
    let s = toml::to_string(&value)?;
    AppConfig::from_str(&s, path)
}

fn parse(s: &str) -> Result<Vec<Override>> {
    let mut scripts = vec![];
    let mut key: Option<String> = None;
    let mut buf = String::new();
    let mut depth = 0i32;
    let mut chars = s.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\'' => {
                buf.push(ch);
                let mut closed = false;
                while let Some(c) = chars.next() {
                    buf.push(c);
                    if c == '\\' && ch == '"' {
                        if let Some(escaped) = chars.next() {
                            buf.push(escaped);
                        }
                        continue;
                    }
                    if c == ch {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    bail!("unexpected end of input, expected `{ch}`");
                }
            }
            '[' | '{' => {
                depth += 1;
                buf.push(ch);
            }
            ']' | '}' => {
                depth -= 1;
                buf.push(ch);
            }
            '=' if depth <= 0 => {
                if key.is_some() {
                    bail!("expected separator, found `=`");
                }
                key = Some(mem::take(&mut buf).trim().to_owned());
            }
            _ if depth <= 0 && SEPARATORS.contains(&ch) => {
                finish(&mut key, &mut buf, &mut scripts)?;
            }
            _ => buf.push(ch),
        }
    }
    finish(&mut key, &mut buf, &mut scripts)?;
    Ok(scripts)
}

fn finish(key: &mut Option<String>, buf: &mut String, scripts: &mut Vec<Override>) -> Result<()> {
    let value = mem::take(buf);
    let value = value.trim();
    let Some(key) = key.take() else {
        if value.is_empty() {
            return Ok(());
        }
        bail!("expected `=` after `{value}`");
    };
    if key.is_empty() {
        bail!("missing key before `=`");
    }
    if value.is_empty() {
        scripts.push(Override::Delete(key));
        return Ok(());
    }
    let parsed: Value =
        toml::from_str(&format!("v = {value}")).with_context(|| format!("invalid value `{value}`"))?;
    let value = parsed
        .get("v")
        .cloned()
        .with_context(|| format!("invalid value `{value}`"))?;
    scripts.push(Override::Set(key, value));
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn test_parse() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse(";\n;").unwrap().is_empty());
        assert_eq!(
            parse("vfh.num_sectors = 7").unwrap(),
            [Override::Set("vfh.num_sectors".into(), Value::Integer(7))]
        );
        assert_eq!(
            parse(r#"serial.port = "a;b" ; logging.directory ="#).unwrap(),
            [
                Override::Set("serial.port".into(), Value::String("a;b".into())),
                Override::Delete("logging.directory".into()),
            ]
        );
        assert_eq!(
            parse("a = [1, 2]\nb = 'x=y'").unwrap(),
            [
                Override::Set(
                    "a".into(),
                    Value::Array(vec![Value::Integer(1), Value::Integer(2)])
                ),
                Override::Set("b".into(), Value::String("x=y".into())),
            ]
        );

        assert!(parse("a").is_err());
        assert!(parse("a = b").is_err());
        assert!(parse("a = 1 = 2").is_err());
        assert!(parse("= 1").is_err());
        assert!(parse(r#"a = "unterminated"#).is_err());
    }

    #[test]
    fn test_apply_to_config() {
        let config = apply_to_config(
            None,
            r#"vfh.threshold_distance = 0.8; search.behavior = "rotate"; serial.enabled = false"#,
            "default.toml",
        )
        .unwrap();
        assert_approx_eq!(config.vfh.threshold_distance, 0.8);
        assert_eq!(config.search.behavior, vfhnav_core::SearchBehavior::Rotate);
        assert!(!config.serial.enabled);
        assert_eq!(config.vfh.num_sectors, 5);

        let doc = "[marker]\napproach_distance = 0.7\n[logging]\ndirectory = \"/tmp/logs\"\n";
        let config = apply_to_config(Some(doc), "logging.directory =", "file.toml").unwrap();
        assert_approx_eq!(config.marker.approach_distance, 0.7);
        assert!(config.logging.directory.is_none());
    }

    #[test]
    fn test_apply_to_config_errors() {
        assert!(matches!(
            apply_to_config(None, "vfh.num_sectors", "default.toml"),
            Err(Error::InvalidOverride(..))
        ));
        assert!(matches!(
            apply_to_config(None, "vfh.unknown = 1", "default.toml"),
            Err(Error::TomlParseFailure(..))
        ));
    }
}
