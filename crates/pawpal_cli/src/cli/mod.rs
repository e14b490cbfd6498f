use clap::{Parser, Subcommand};
use pawpal_core::config::{ConfigOverrides, canonical_key};
use std::collections::HashMap;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daily care planner for your pets", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage owners
    Owner {
        #[command(subcommand)]
        command: OwnerCommand,
    },
    /// Manage pets
    Pet {
        #[command(subcommand)]
        command: PetCommand,
    },
    /// Manage care tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Show details of a task
    ///
    /// Example: pawpal show task-1
    Show { id: String },
    /// Mark a task as done; recurring tasks get their next occurrence
    ///
    /// Example: pawpal done task-1
    Done { id: String },
    /// Show the ordered plan for a day with conflict warnings
    ///
    /// Example: pawpal plan
    /// Example: pawpal plan --date 2024-01-01 --status pending
    /// Example: pawpal plan --owner Taylor --pet Fido
    Plan {
        /// Day to plan (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Only include tasks with this status (pending or done)
        #[arg(long)]
        status: Option<String>,
        /// Owner of the pet to filter on
        #[arg(long, requires = "pet")]
        owner: Option<String>,
        /// Only include tasks of this pet
        #[arg(long, requires = "owner")]
        pet: Option<String>,
    },
    /// List tasks that share the exact same due time
    ///
    /// Example: pawpal conflicts --date 2024-01-01
    Conflicts {
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum OwnerCommand {
    /// Example: pawpal owner add Taylor
    Add { name: String },
    /// Example: pawpal owner remove Taylor
    Remove { name: String },
    /// Example: pawpal owner list
    List,
}

#[derive(Subcommand, Debug)]
pub enum PetCommand {
    /// Example: pawpal pet add Taylor Fido --species dog --age 4
    Add {
        owner: String,
        name: String,
        #[arg(long, default_value = "dog")]
        species: String,
        #[arg(long, default_value_t = 0)]
        age: u32,
        #[arg(long, default_value = "")]
        notes: String,
    },
    /// Example: pawpal pet remove Taylor Fido
    Remove { owner: String, name: String },
    /// Example: pawpal pet list Taylor
    List { owner: String },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Schedule a care task for a pet
    ///
    /// Example: pawpal task add Taylor Fido "Morning walk" --at "2024-01-01 08:00"
    /// Example: pawpal task add Taylor Fido Feed --at 2024-01-01T07:30 --priority 1 --repeat daily
    Add {
        owner: String,
        pet: String,
        title: String,
        /// Due time: "YYYY-MM-DD HH:MM[:SS]" or "YYYY-MM-DD" for midnight
        #[arg(long)]
        at: String,
        /// 1 (most urgent) to 5; defaults to the configured priority
        #[arg(long)]
        priority: Option<u8>,
        /// none, daily or weekly
        #[arg(long, default_value = "none")]
        repeat: String,
    },
    /// Example: pawpal task remove task-1
    Remove { id: String },
}

/// Flag name used to identify config override arguments by the runtime.
pub const CONFIG_OVERRIDE_FLAG: &str = "--config-override";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    Alias(String),
    DefaultPriority,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let (field, remainder) = key_raw
        .split_once('.')
        .map(|(field, rest)| (field.trim(), Some(rest.trim())))
        .unwrap_or((key_raw.trim(), None));

    let canonical_field = canonical_key(field);
    if canonical_field.is_empty() {
        return Err("override key cannot be empty".to_string());
    }

    match canonical_field.as_str() {
        "theme" | "default_priority" if remainder.is_some() => {
            Err(format!("{canonical_field} override cannot have subfields"))
        }
        "theme" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::Theme,
            value,
        }),
        "default_priority" | "priority" => Ok(ParsedConfigOverride {
            target: ConfigOverrideTarget::DefaultPriority,
            value,
        }),
        "aliases" | "alias" => {
            let alias_name = remainder
                .filter(|segment| !segment.is_empty())
                .ok_or_else(|| "aliases override requires an alias name".to_string())?;
            Ok(ParsedConfigOverride {
                target: ConfigOverrideTarget::Alias(alias_name.to_string()),
                value,
            })
        }
        other => Err(format!("unknown config field '{other}'")),
    }
}

/// Folds parsed overrides into the structure the config layer merges.
pub fn collect_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::Alias(name) => {
                overrides.aliases.insert(name, parsed.value);
            }
            ConfigOverrideTarget::DefaultPriority => {
                let priority = parsed.value.parse::<u8>().map_err(|_| {
                    format!("default_priority must be a number, got '{}'", parsed.value)
                })?;
                overrides.default_priority = Some(priority);
            }
        }
    }
    Ok(overrides)
}

/// Pulls `--config-override` values out of raw arguments before clap runs,
/// so aliases defined through overrides can be expanded.
pub fn scan_config_overrides(args: &[String]) -> Vec<String> {
    let mut values = Vec::new();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == CONFIG_OVERRIDE_FLAG {
            if let Some(value) = iter.next() {
                values.push(value.clone());
            }
        } else if let Some(value) = arg
            .strip_prefix(CONFIG_OVERRIDE_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            values.push(value.to_string());
        }
    }
    values
}

/// Replaces the first command word with its alias, if one is defined.
///
/// `args` excludes the program name. Leading flags are kept in place.
pub fn expand_alias(
    args: Vec<String>,
    aliases: &HashMap<String, String>,
) -> Result<Vec<String>, String> {
    let mut index = 0;
    while index < args.len() {
        let arg = &args[index];
        if arg == CONFIG_OVERRIDE_FLAG {
            index += 2;
        } else if arg.starts_with('-') {
            index += 1;
        } else {
            break;
        }
    }

    let Some(expansion) = args.get(index).and_then(|word| aliases.get(word)) else {
        return Ok(args);
    };

    let replacement = split_command_line(expansion)?;
    let mut expanded = Vec::with_capacity(args.len() + replacement.len());
    expanded.extend_from_slice(&args[..index]);
    expanded.extend(replacement);
    expanded.extend_from_slice(&args[index + 1..]);
    Ok(expanded)
}

/// Splits a command line on whitespace, honoring double quotes.
pub fn split_command_line(line: &str) -> Result<Vec<String>, String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut escape = false;
    let mut quoted = false;

    for ch in line.chars() {
        if escape {
            if ch != '"' && ch != '\\' {
                current.push('\\');
            }
            current.push(ch);
            escape = false;
            continue;
        }

        if in_quotes && ch == '\\' {
            escape = true;
            continue;
        }

        if ch == '"' {
            in_quotes = !in_quotes;
            quoted = true;
            continue;
        }

        if ch.is_whitespace() && !in_quotes {
            if !current.is_empty() || quoted {
                args.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }

        current.push(ch);
    }

    if in_quotes {
        return Err("unterminated quote in command".to_string());
    }

    if !current.is_empty() || quoted {
        args.push(current);
    }

    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigOverrideTarget, collect_overrides, expand_alias, parse_config_override,
        scan_config_overrides, split_command_line,
    };
    use std::collections::HashMap;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parse_config_override_canonicalizes_field_names() {
        let parsed = parse_config_override(" THEME = Noir ").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Theme);
        assert_eq!(parsed.value, "Noir");

        let parsed = parse_config_override("Default-Priority=2").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::DefaultPriority);
    }

    #[test]
    fn parse_config_override_rejects_bad_input() {
        assert!(
            parse_config_override("aliases. = foo")
                .unwrap_err()
                .contains("requires an alias name")
        );
        assert!(
            parse_config_override("unknown.field=value")
                .unwrap_err()
                .contains("unknown config field")
        );
        assert!(parse_config_override("aliasesls").unwrap_err().contains("KEY=VALUE"));
        assert!(
            parse_config_override("theme.x=noir")
                .unwrap_err()
                .contains("cannot have subfields")
        );
    }

    #[test]
    fn parse_config_override_trims_alias_names() {
        let parsed = parse_config_override("aliases. today = plan --status pending").unwrap();
        assert_eq!(parsed.target, ConfigOverrideTarget::Alias("today".to_string()));
        assert_eq!(parsed.value, "plan --status pending");
    }

    #[test]
    fn collect_overrides_builds_structure() {
        let overrides = collect_overrides(&strings(&[
            "theme=noir",
            "aliases.today=plan",
            "default_priority=1",
        ]))
        .unwrap();

        assert_eq!(overrides.theme.as_deref(), Some("noir"));
        assert_eq!(overrides.aliases.get("today").map(String::as_str), Some("plan"));
        assert_eq!(overrides.default_priority, Some(1));

        assert!(collect_overrides(&strings(&["default_priority=high"])).is_err());
    }

    #[test]
    fn scan_config_overrides_finds_both_spellings() {
        let args = strings(&[
            "--config-override",
            "theme=noir",
            "plan",
            "--config-override=aliases.t=plan",
        ]);
        assert_eq!(
            scan_config_overrides(&args),
            strings(&["theme=noir", "aliases.t=plan"])
        );
    }

    #[test]
    fn expand_alias_replaces_first_command_word() {
        let aliases: HashMap<String, String> =
            [("today".to_string(), "plan --status pending".to_string())]
                .into_iter()
                .collect();

        let expanded = expand_alias(strings(&["--json", "today"]), &aliases).unwrap();
        assert_eq!(expanded, strings(&["--json", "plan", "--status", "pending"]));

        let untouched = expand_alias(strings(&["plan", "today"]), &aliases).unwrap();
        assert_eq!(untouched, strings(&["plan", "today"]));
    }

    #[test]
    fn split_command_line_honors_quotes() {
        let line = r#"task add Taylor Fido "Morning walk" --at "2024-01-01 08:00""#;
        let args = split_command_line(line).unwrap();
        assert_eq!(
            args,
            strings(&[
                "task",
                "add",
                "Taylor",
                "Fido",
                "Morning walk",
                "--at",
                "2024-01-01 08:00"
            ])
        );
        assert!(split_command_line("show \"task-1").is_err());
    }
}
