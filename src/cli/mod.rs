//! CLI subcommands — compile, validate, deps, schema.

use crate::core::{assembler, dependencies, parser, template::Template, types};
use clap::{Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compile a function definition into a template
    Compile {
        /// Path to the function definition (.yaml, .json, .toml)
        #[arg(short, long, default_value = "function.yaml")]
        file: PathBuf,

        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Template format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },

    /// Validate a function definition without compiling it
    Validate {
        /// Path to the function definition
        #[arg(short, long, default_value = "function.yaml")]
        file: PathBuf,
    },

    /// Print the external resources a function depends on
    Deps {
        /// Path to the function definition
        #[arg(short, long, default_value = "function.yaml")]
        file: PathBuf,
    },

    /// Print the JSON schema of the definition format
    Schema,
}

/// Template serialization format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands) -> Result<(), String> {
    match cmd {
        Commands::Compile {
            file,
            output,
            format,
        } => cmd_compile(&file, output.as_deref(), format),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::Deps { file } => cmd_deps(&file),
        Commands::Schema => cmd_schema(),
    }
}

fn cmd_compile(file: &Path, output: Option<&Path>, format: OutputFormat) -> Result<(), String> {
    let def = parse_and_validate(file)?;
    let template = assembler::compile_definition(&def).map_err(|e| e.to_string())?;
    let rendered = render(&template, format)?;

    let Some(output) = output else {
        println!("{}", rendered);
        return Ok(());
    };

    if existing_fingerprint(output, format).as_deref() == Some(template.fingerprint()?.as_str()) {
        println!("{}: unchanged", output.display());
        return Ok(());
    }
    write_atomic(output, &rendered)?;
    println!(
        "{}: wrote template ({} parameters, {} resources)",
        output.display(),
        template.parameters.len(),
        template.resources.len()
    );
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let def = parse_and_validate(file)?;
    println!(
        "OK: {} ({} permissions, {} variables{})",
        def.name,
        def.function.permissions.len(),
        def.function.environment.len(),
        if def.function.event_source.is_some() {
            ", event source"
        } else {
            ""
        }
    );
    Ok(())
}

fn cmd_deps(file: &Path) -> Result<(), String> {
    let def = parse_and_validate(file)?;
    let deps = dependencies::dependencies(&def.function);
    let json =
        serde_json::to_string_pretty(&deps).map_err(|e| format!("JSON serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn cmd_schema() -> Result<(), String> {
    let schema = schemars::schema_for!(types::FunctionDefinition);
    let json = serde_json::to_string_pretty(&schema)
        .map_err(|e| format!("JSON serialize error: {}", e))?;
    println!("{}", json);
    Ok(())
}

fn parse_and_validate(file: &Path) -> Result<types::FunctionDefinition, String> {
    let def = parser::parse_definition_file(file)?;
    let errors = parser::validate_definition(&def);
    if errors.is_empty() {
        return Ok(def);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err(format!("{} validation error(s)", errors.len()))
}

fn render(template: &Template, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => template.to_json(),
        OutputFormat::Yaml => template.to_yaml(),
    }
}

/// Fingerprint of a previously written template, if it parses.
fn existing_fingerprint(path: &Path, format: OutputFormat) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    let parsed = match format {
        OutputFormat::Json => Template::from_json(&content),
        OutputFormat::Yaml => Template::from_yaml(&content),
    };
    match parsed {
        Ok(template) => template.fingerprint().ok(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "existing template unreadable, rewriting");
            None
        }
    }
}

/// Write to a temp file, then rename over the target.
fn write_atomic(path: &Path, content: &str) -> Result<(), String> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
    }
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, content)
        .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        format!(
            "cannot rename {} → {}: {}",
            tmp_path.display(),
            path.display(),
            e
        )
    })
}
