use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};

use armflow_core::diagram::{self, DiagramConfig};
use armflow_core::forest;
use armflow_core::layout::{self, Orientation};
use armflow_core::resolver::ResolverConfig;
use armflow_core::template::ArmTemplate;
use armflow_history::{HistoryStore, TemplateHistory};

#[derive(Parser)]
#[command(name = "armflow")]
#[command(about = "Render Azure ARM templates as dependency diagrams", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a template file
    Validate {
        /// Path to template JSON
        #[arg(default_value = "azuredeploy.json")]
        file: PathBuf,
    },
    /// Show template contents: parameters, variables, resources
    Inspect {
        /// Path to template JSON
        #[arg(default_value = "azuredeploy.json")]
        file: PathBuf,
    },
    /// Print the resolved dependency forest
    Tree {
        /// Path to template JSON
        #[arg(default_value = "azuredeploy.json")]
        file: PathBuf,

        /// Disable the network-type keyword fallback
        #[arg(long)]
        strict: bool,
    },
    /// Compute the diagram layout and emit node/edge JSON
    Layout {
        /// Path to template JSON
        #[arg(default_value = "azuredeploy.json")]
        file: PathBuf,

        /// Layout orientation
        #[arg(long, value_enum, default_value_t = OrientationArg::TopDown)]
        orientation: OrientationArg,

        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Disable the network-type keyword fallback
        #[arg(long)]
        strict: bool,

        /// Emit only the resource forest, without the document scaffold
        #[arg(long)]
        resources_only: bool,
    },
    /// Show a line diff between two template files
    Diff {
        old: PathBuf,
        new: PathBuf,
    },
    /// Template snapshot history commands
    History {
        #[command(subcommand)]
        command: HistoryCommands,
    },
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// Record a template as a new snapshot
    Push {
        /// Path to template JSON
        file: PathBuf,

        /// History file location
        #[arg(long, default_value = "armflow.history.json")]
        store: PathBuf,
    },
    /// Step back and print the previous template
    Undo {
        /// History file location
        #[arg(long, default_value = "armflow.history.json")]
        store: PathBuf,
    },
    /// Step forward and print the next template
    Redo {
        /// History file location
        #[arg(long, default_value = "armflow.history.json")]
        store: PathBuf,
    },
    /// List recorded snapshots
    Show {
        /// History file location
        #[arg(long, default_value = "armflow.history.json")]
        store: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    TopDown,
    LeftToRight,
}

impl From<OrientationArg> for Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::TopDown => Orientation::TopDown,
            OrientationArg::LeftToRight => Orientation::LeftToRight,
        }
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Inspect { file } => run_inspect(&file),
        Commands::Tree { file, strict } => run_tree(&file, strict),
        Commands::Layout {
            file,
            orientation,
            output,
            pretty,
            strict,
            resources_only,
        } => run_layout(&file, orientation, output, pretty, strict, resources_only),
        Commands::Diff { old, new } => run_diff(&old, &new),
        Commands::History { command } => run_history_command(command),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn load_template(file: &PathBuf) -> Result<ArmTemplate, String> {
    ArmTemplate::from_path(file).map_err(|e| format!("Failed to load {}: {}", file.display(), e))
}

fn run_validate(file: &PathBuf) -> Result<(), String> {
    let template = load_template(file)?;

    println!(
        "{}",
        format!("✓ {} is a well-formed ARM template.", file.display())
            .green()
            .bold()
    );
    if let Some(version) = &template.content_version {
        println!("  contentVersion: {}", version);
    }
    println!(
        "  {} parameters, {} variables, {} resources",
        template.parameters.len(),
        template.variables.len(),
        template.resources.len()
    );
    for resource in &template.resources {
        println!(
            "  • {} {}",
            resource.resource_type.as_deref().unwrap_or("Unknown"),
            resource.name.as_deref().unwrap_or("(unnamed)")
        );
    }

    Ok(())
}

fn run_inspect(file: &PathBuf) -> Result<(), String> {
    let template = load_template(file)?;

    println!("{}", "Template".cyan().bold());
    println!("  schema: {}", template.schema);
    if let Some(version) = &template.content_version {
        println!("  contentVersion: {}", version);
    }

    if !template.parameters.is_empty() {
        println!("\n{}", "Parameters".cyan().bold());
        for (name, definition) in &template.parameters {
            let mut line = format!(
                "  {}: {}",
                name,
                definition.parameter_type.as_deref().unwrap_or("unknown")
            );
            if let Some(default) = &definition.default_value {
                line.push_str(&format!(" (default: {})", default));
            }
            println!("{}", line);
            if let Some(description) = definition.description() {
                println!("    {}", description.dimmed());
            }
        }
    }

    if !template.variables.is_empty() {
        println!("\n{}", "Variables".cyan().bold());
        for (name, value) in &template.variables {
            println!("  {}: {}", name, value);
        }
    }

    if !template.resources.is_empty() {
        println!("\n{}", "Resources".cyan().bold());
        for resource in &template.resources {
            let mut line = format!(
                "  • {} {}",
                resource.resource_type.as_deref().unwrap_or("Unknown"),
                resource.name.as_deref().unwrap_or("(unnamed)")
            );
            if let Some(location) = &resource.location {
                line.push_str(&format!(" [{}]", location));
            }
            println!("{}", line);
        }
    }

    Ok(())
}

fn run_tree(file: &PathBuf, strict: bool) -> Result<(), String> {
    let template = load_template(file)?;
    let config = ResolverConfig {
        type_keyword_fallback: !strict,
    };

    let forest = forest::build_forest(&template.resources, &config);
    if forest.is_empty() {
        println!("{}", "No resources defined in template.".yellow());
        return Ok(());
    }

    print!("{}", forest.format_tree());
    println!(
        "{}",
        format!("{} resources, {} roots", forest.len(), forest.roots().len()).dimmed()
    );

    Ok(())
}

fn run_layout(
    file: &PathBuf,
    orientation: OrientationArg,
    output: Option<PathBuf>,
    pretty: bool,
    strict: bool,
    resources_only: bool,
) -> Result<(), String> {
    let template = load_template(file)?;

    let mut config = DiagramConfig::default();
    config.resolver.type_keyword_fallback = !strict;
    config.layout.orientation = orientation.into();

    let diagram = if resources_only {
        let mut forest = forest::build_forest(&template.resources, &config.resolver);
        layout::layout(&mut forest, &config.layout);
        diagram::render_forest(&forest)
    } else {
        diagram::build_diagram(&template, &config)
    };

    let json = if pretty {
        serde_json::to_string_pretty(&diagram)
    } else {
        serde_json::to_string(&diagram)
    }
    .map_err(|e| format!("Failed to serialize diagram: {}", e))?;

    match output {
        Some(path) => {
            fs::write(&path, json)
                .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
            println!(
                "{}",
                format!(
                    "✓ {} nodes, {} edges written to {}",
                    diagram.nodes.len(),
                    diagram.edges.len(),
                    path.display()
                )
                .green()
                .bold()
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn run_diff(old: &PathBuf, new: &PathBuf) -> Result<(), String> {
    let old_content =
        fs::read_to_string(old).map_err(|e| format!("Failed to read {}: {}", old.display(), e))?;
    let new_content =
        fs::read_to_string(new).map_err(|e| format!("Failed to read {}: {}", new.display(), e))?;

    if old_content == new_content {
        println!("{}", "Templates are identical.".green());
        return Ok(());
    }

    let diff = TextDiff::from_lines(&old_content, &new_content);
    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => "-".red(),
            ChangeTag::Insert => "+".green(),
            ChangeTag::Equal => " ".normal(),
        };
        print!("{}{}", sign, change);
    }

    Ok(())
}

fn run_history_command(command: HistoryCommands) -> Result<(), String> {
    match command {
        HistoryCommands::Push { file, store } => run_history_push(&file, store),
        HistoryCommands::Undo { store } => run_history_step(store, Step::Undo),
        HistoryCommands::Redo { store } => run_history_step(store, Step::Redo),
        HistoryCommands::Show { store } => run_history_show(store),
    }
}

enum Step {
    Undo,
    Redo,
}

fn open_history(store_path: PathBuf) -> Result<(HistoryStore, TemplateHistory), String> {
    let mut store = HistoryStore::with_path(store_path);
    let history = store
        .load()
        .map_err(|e| format!("Failed to load history: {}", e))?
        .unwrap_or_default();
    Ok((store, history))
}

fn run_history_push(file: &PathBuf, store_path: PathBuf) -> Result<(), String> {
    let template = load_template(file)?;
    let (store, mut history) = open_history(store_path)?;

    history.push(template);
    store
        .save(&history)
        .map_err(|e| format!("Failed to save history: {}", e))?;

    println!(
        "{}",
        format!(
            "✓ Snapshot recorded ({}/{})",
            history.position(),
            history.len()
        )
        .green()
        .bold()
    );

    Ok(())
}

fn run_history_step(store_path: PathBuf, step: Step) -> Result<(), String> {
    let (store, mut history) = open_history(store_path)?;

    let template = match step {
        Step::Undo => history.undo().cloned(),
        Step::Redo => history.redo().cloned(),
    };

    let Some(template) = template else {
        let edge = match step {
            Step::Undo => "Already at the oldest snapshot.",
            Step::Redo => "Already at the newest snapshot.",
        };
        println!("{}", edge.yellow());
        return Ok(());
    };

    store
        .save(&history)
        .map_err(|e| format!("Failed to save history: {}", e))?;

    let json = serde_json::to_string_pretty(&template)
        .map_err(|e| format!("Failed to serialize template: {}", e))?;
    println!("{}", json);

    Ok(())
}

fn run_history_show(store_path: PathBuf) -> Result<(), String> {
    let (_, history) = open_history(store_path)?;

    if history.is_empty() {
        println!("{}", "History is empty.".yellow());
        return Ok(());
    }

    println!("{}", "Snapshots".cyan().bold());
    let current = history.position();
    for (i, snapshot) in history.snapshots().iter().enumerate() {
        let marker = if i + 1 == current { ">" } else { " " };
        println!(
            "{} {} {} ({} resources)",
            marker,
            i + 1,
            snapshot.taken_at.format("%Y-%m-%d %H:%M:%S UTC"),
            snapshot.template.resources.len()
        );
    }

    Ok(())
}
