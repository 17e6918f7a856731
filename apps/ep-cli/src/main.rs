use clap::{Args, Parser, Subcommand};
use ep_app::{AppError, AppResult, DerivedPlan, PlanOptions, project_service};
use ep_core::{BoardId, ProtectionRole};
use ep_engine::{RailSource, order_list, parts_list, symbol_summary};
use ep_project::Project;
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ep-cli")]
#[command(about = "elplan CLI - circuits, RCD groups and cabinets for electrical installation plans", long_about = None)]
struct Cli {
    /// Device catalog YAML replacing the built-in catalog
    #[arg(long, global = true)]
    devices: Option<PathBuf>,
    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate project file syntax and structure
    Validate {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// List distribution boards and their feeding networks
    Boards {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Show derived circuits
    Circuits {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Only circuits on this board
        #[arg(long)]
        board: Option<String>,
        /// Only circuits needing this protection role (mcb, rcd, rcbo, afdd, rcd_type_b)
        #[arg(long)]
        role: Option<ProtectionRole>,
        #[command(flatten)]
        grouping: GroupingArgs,
    },
    /// Show shared-RCD groups
    RcdGroups {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Only groups on this board
        #[arg(long)]
        board: Option<String>,
        #[command(flatten)]
        grouping: GroupingArgs,
    },
    /// Show the upstream supply chain of a board
    Upstream {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Board ID
        board: String,
    },
    /// Show the cabinet layout of a board
    Cabinet {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
        /// Board ID
        board: String,
        /// Usable rail width in TE
        #[arg(long, default_value_t = ep_engine::DEFAULT_RAIL_WIDTH_TE)]
        rail_width: u32,
        #[command(flatten)]
        grouping: GroupingArgs,
    },
    /// Bill of materials with prices
    Bom {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Material order list without prices
    OrderList {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
    /// Count placed symbols per type
    Summary {
        /// Path to the project YAML or JSON file
        project_path: PathBuf,
    },
}

/// Overrides for the project's RCD grouping settings.
#[derive(Args, Debug, Clone, Copy, Default)]
struct GroupingArgs {
    /// Maximum number of circuits behind one shared RCD
    #[arg(long)]
    max_per_rcd: Option<usize>,
    /// Separate RCD groups by room
    #[arg(long)]
    by_room: bool,
    /// Separate RCD groups by rated current
    #[arg(long)]
    by_rating: bool,
    /// Separate RCD groups by grouping hint
    #[arg(long)]
    by_type: bool,
}

impl GroupingArgs {
    fn plan_options(&self, project: &Project) -> PlanOptions {
        let strategy = (self.by_room || self.by_rating || self.by_type).then(|| {
            let mut strategy = project.rcd_strategy;
            strategy.separate_by_room |= self.by_room;
            strategy.separate_by_rated_current |= self.by_rating;
            strategy.separate_by_type |= self.by_type;
            strategy
        });
        PlanOptions {
            max_per_rcd: self.max_per_rcd,
            strategy,
            ..PlanOptions::default()
        }
    }
}

struct Context {
    devices: Option<PathBuf>,
    json: bool,
}

impl Context {
    fn derive(&self, project: &Project, options: &PlanOptions) -> AppResult<DerivedPlan> {
        if options.max_per_rcd == Some(0) {
            return Err(AppError::InvalidInput(
                "--max-per-rcd must be at least 1".to_string(),
            ));
        }
        let devices = project_service::device_catalog(self.devices.as_deref())?;
        tracing::debug!(catalog = ?self.devices, devices = devices.len(), "device catalog ready");
        let symbols = project_service::symbol_catalog();
        Ok(ep_app::derive_plan(project, &symbols, &devices, options))
    }

    /// Print `value` as JSON when requested; otherwise run `human`.
    fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> AppResult<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human(value);
        }
        Ok(())
    }
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = Context {
        devices: cli.devices,
        json: cli.json,
    };

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Boards { project_path } => cmd_boards(&ctx, &project_path),
        Commands::Circuits {
            project_path,
            board,
            role,
            grouping,
        } => cmd_circuits(&ctx, &project_path, board.as_deref(), role, &grouping),
        Commands::RcdGroups {
            project_path,
            board,
            grouping,
        } => cmd_rcd_groups(&ctx, &project_path, board.as_deref(), &grouping),
        Commands::Upstream {
            project_path,
            board,
        } => cmd_upstream(&ctx, &project_path, &board),
        Commands::Cabinet {
            project_path,
            board,
            rail_width,
            grouping,
        } => cmd_cabinet(&ctx, &project_path, &board, rail_width, &grouping),
        Commands::Bom { project_path } => cmd_bom(&ctx, &project_path),
        Commands::OrderList { project_path } => cmd_order_list(&ctx, &project_path),
        Commands::Summary { project_path } => cmd_summary(&ctx, &project_path),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_boards(ctx: &Context, project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let boards = project_service::list_boards(&project);

    ctx.emit(&boards, |boards| {
        if boards.is_empty() {
            println!("No boards found in project");
            return;
        }
        println!("Boards in project:");
        for board in boards {
            let networks: Vec<&str> = board.network_ids.iter().map(|n| n.as_str()).collect();
            let fed_by = if networks.is_empty() {
                "no network".to_string()
            } else {
                networks.join(", ")
            };
            let marker = if board.declared { "" } else { " (undeclared)" };
            println!(
                "  {} - {}{} ({} symbols, fed by {})",
                board.id, board.name, marker, board.symbol_count, fed_by
            );
        }
    })
}

fn cmd_circuits(
    ctx: &Context,
    project_path: &Path,
    board: Option<&str>,
    role: Option<ProtectionRole>,
    grouping: &GroupingArgs,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let plan = ctx.derive(&project, &grouping.plan_options(&project))?;
    let circuits: Vec<_> = plan
        .circuits
        .iter()
        .filter(|c| board.is_none_or(|b| c.board_id.as_str() == b))
        .filter(|c| role.is_none_or(|r| c.has_role(r)))
        .collect();

    ctx.emit(&circuits, |circuits| {
        for circuit in circuits {
            println!(
                "{} [{}] {} ({} symbols)",
                circuit.id,
                project.board_name(&circuit.board_id),
                circuit.name,
                circuit.symbol_ids.len()
            );
            for req in &circuit.requirements {
                let device = circuit
                    .device(req.role)
                    .map(|d| d.as_str())
                    .unwrap_or("no matching device");
                println!("    {:<14} {}", req.describe(), device);
            }
            for conflict in &circuit.conflicts {
                println!(
                    "    ! {} {:?} conflict: {}",
                    conflict.role.label(),
                    conflict.field,
                    conflict.values.join(" / ")
                );
            }
        }
    })
}

fn cmd_rcd_groups(
    ctx: &Context,
    project_path: &Path,
    board: Option<&str>,
    grouping: &GroupingArgs,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let plan = ctx.derive(&project, &grouping.plan_options(&project))?;
    let groups: Vec<_> = plan
        .rcd_groups
        .iter()
        .filter(|g| board.is_none_or(|b| g.board_id.as_str() == b))
        .collect();

    ctx.emit(&groups, |groups| {
        if groups.is_empty() {
            println!("No shared RCD groups");
            return;
        }
        for group in groups {
            let kind = if group.manual { "manual" } else { "auto" };
            let device = group.device_id.as_ref().map(|d| d.as_str()).unwrap_or("-");
            println!(
                "{} [{}] {} {} ({})",
                group.id,
                project.board_name(&group.board_id),
                group.requirement.describe(),
                device,
                kind
            );
            for circuit_id in &group.circuit_ids {
                println!("    {}", circuit_id);
            }
        }
    })
}

fn cmd_upstream(ctx: &Context, project_path: &Path, board: &str) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    project_service::get_board(&project, board)?;
    let plan = ctx.derive(&project, &PlanOptions::default())?;
    let board_id = BoardId::from(board);
    let supplies = plan
        .board(&board_id)
        .map(|b| b.supplies.clone())
        .unwrap_or_default();

    ctx.emit(&supplies, |supplies| {
        if supplies.is_empty() {
            println!("No network feeds board {}", board);
            return;
        }
        for supply in supplies {
            println!("{} ({})", supply.network_name, supply.network_id);
            for device in &supply.devices {
                println!("    {:<20} {}", device.label, device.sublabel);
            }
        }
    })
}

fn cmd_cabinet(
    ctx: &Context,
    project_path: &Path,
    board: &str,
    rail_width: u32,
    grouping: &GroupingArgs,
) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    project_service::get_board(&project, board)?;
    let options = PlanOptions {
        rail_width_te: rail_width,
        ..grouping.plan_options(&project)
    };
    let plan = ctx.derive(&project, &options)?;
    let board_id = BoardId::from(board);
    let Some(board_plan) = plan.board(&board_id) else {
        return Err(AppError::BoardNotFound(board.to_string()));
    };

    ctx.emit(&board_plan.cabinet, |layout| {
        println!(
            "{}: {} TE on {} rail(s) of {} TE",
            project.board_name(&layout.board_id),
            layout.total_te,
            layout.rails,
            layout.rail_width
        );
        let mut current = None;
        for entry in &layout.entries {
            if current != Some(entry.rail) {
                println!("  Rail {}", entry.rail + 1);
                current = Some(entry.rail);
            }
            let tag = match &entry.source {
                RailSource::Upstream(_) => "supply".to_string(),
                RailSource::SharedRcd(id) => format!("RCD {}", id),
                RailSource::Circuit(id) => id.to_string(),
            };
            println!(
                "    {:>2} TE  {:<24} {:<24} {}",
                entry.te_width, entry.label, entry.caption, tag
            );
        }
    })
}

fn cmd_bom(ctx: &Context, project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let parts = parts_list(&project.symbols);

    ctx.emit(&parts, |parts| {
        for row in &parts.rows {
            println!(
                "{:>8.2} {:<4} {:<32} {:>9.2} {:>10.2}",
                row.quantity, row.unit, row.description, row.unit_price, row.total
            );
        }
        println!("{:>67.2}", parts.total);
    })
}

fn cmd_order_list(ctx: &Context, project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let rows = order_list(&project.symbols);

    ctx.emit(&rows, |rows| {
        for row in rows {
            println!("{:>8.2} {:<4} {}", row.quantity, row.unit, row.description);
        }
    })
}

fn cmd_summary(ctx: &Context, project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let counts = symbol_summary(&project.symbols, &project_service::symbol_catalog());

    ctx.emit(&counts, |counts| {
        for count in counts {
            println!("{:>4} x {} ({})", count.count, count.label, count.key);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn grouping_flags_extend_project_strategy() {
        let mut project = Project::new("t");
        project.rcd_strategy.separate_by_room = true;

        let none = GroupingArgs::default().plan_options(&project);
        assert_eq!(none.strategy, None);
        assert_eq!(none.max_per_rcd, None);

        let args = GroupingArgs {
            max_per_rcd: Some(3),
            by_type: true,
            ..GroupingArgs::default()
        };
        let options = args.plan_options(&project);
        let strategy = options.strategy.unwrap();
        assert!(strategy.separate_by_room);
        assert!(strategy.separate_by_type);
        assert!(!strategy.separate_by_rated_current);
        assert_eq!(options.max_per_rcd, Some(3));
    }

    #[test]
    fn role_filter_parses_role_keys() {
        let cli = Cli::try_parse_from(["ep-cli", "circuits", "plan.yaml", "--role", "afdd"]).unwrap();
        match cli.command {
            Commands::Circuits { role, .. } => assert_eq!(role, Some(ProtectionRole::Afdd)),
            _ => panic!("wrong subcommand"),
        }
        assert!(Cli::try_parse_from(["ep-cli", "circuits", "plan.yaml", "--role", "fuse"]).is_err());
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ep-cli",
            "rcd-groups",
            "plan.yaml",
            "--max-per-rcd",
            "4",
            "--by-room",
            "--json",
        ])
        .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::RcdGroups { grouping, .. } => {
                assert_eq!(grouping.max_per_rcd, Some(4));
                assert!(grouping.by_room);
            }
            _ => panic!("wrong subcommand"),
        }
    }
}
