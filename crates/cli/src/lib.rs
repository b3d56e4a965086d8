pub mod commands;

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use hrflow_core::config::{AppConfig, LoadOptions, LogFormat};
use hrflow_core::flows::states::ApprovalAction;

#[derive(Debug, Parser)]
#[command(
    name = "hrflow",
    about = "HR approval workflow CLI",
    long_about = "Operate expense and leave approvals against the HR backend: list worklists, approve or reject requests, apply for leave, and inspect configuration.",
    after_help = "Examples:\n  hrflow expenses --role manager --actor-id 42\n  hrflow reject --role manager --actor-id 42 --id 118 --reason \"Missing receipt\"\n  hrflow leaves --role hr --actor-id 7\n  hrflow config"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "List the expense worklist for one actor")]
    Expenses {
        #[arg(long, help = "Acting role: employee, manager, hr, or account-manager")]
        role: String,
        #[arg(long, help = "The actor's role-scoped id")]
        actor_id: i64,
        #[arg(long, help = "Calendar month filter (1-12)")]
        month: Option<u32>,
        #[arg(long, help = "Calendar year filter")]
        year: Option<i32>,
    },
    #[command(about = "Approve one expense request (a reason is required)")]
    Approve {
        #[arg(long)]
        role: String,
        #[arg(long)]
        actor_id: i64,
        #[arg(long, help = "Expense request id")]
        id: i64,
        #[arg(long, help = "Reason recorded with the decision")]
        reason: String,
        #[arg(long, default_value = "operator", help = "Name recorded in the history log")]
        name: String,
    },
    #[command(about = "Reject one expense request (a reason is required)")]
    Reject {
        #[arg(long)]
        role: String,
        #[arg(long)]
        actor_id: i64,
        #[arg(long, help = "Expense request id")]
        id: i64,
        #[arg(long, help = "Reason recorded with the decision")]
        reason: String,
        #[arg(long, default_value = "operator", help = "Name recorded in the history log")]
        name: String,
    },
    #[command(about = "List an approver's pending and reviewed leave requests")]
    Leaves {
        #[arg(long, help = "Acting role: manager or hr")]
        role: String,
        #[arg(long)]
        actor_id: i64,
    },
    #[command(about = "Approve or reject one pending leave at the actor's stage")]
    LeaveAction {
        #[arg(long, help = "Acting role: manager or hr")]
        role: String,
        #[arg(long)]
        actor_id: i64,
        #[arg(long, help = "Leave request id")]
        id: i64,
        #[arg(long, help = "approve or reject")]
        action: String,
        #[arg(long, default_value = "operator", help = "Name recorded in the history log")]
        name: String,
    },
    #[command(about = "Apply for leave as an employee, after a balance check")]
    ApplyLeave {
        #[arg(long)]
        employee_id: i64,
        #[arg(long, help = "Sick, Casual, or Annual")]
        leave_type: String,
        #[arg(long, help = "First day, YYYY-MM-DD")]
        from: String,
        #[arg(long, help = "Last day, YYYY-MM-DD")]
        to: String,
        #[arg(long, help = "Count the period as ending in a half day")]
        half_day: bool,
        #[arg(long)]
        reason: String,
    },
    #[command(about = "Show an employee's remaining leave balances")]
    Balance {
        #[arg(long)]
        employee_id: i64,
    },
    #[command(about = "List an employee's own leave requests")]
    MyLeaves {
        #[arg(long)]
        employee_id: i64,
    },
    #[command(about = "Inspect effective configuration values with redaction")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            let result =
                commands::CommandResult::failure("config", "config_load", error.to_string(), 2);
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);
    tracing::debug!(command = ?cli.command, "dispatching");

    let result = match cli.command {
        Command::Expenses { role, actor_id, month, year } => {
            commands::expenses::run(&config, &role, actor_id, month, year)
        }
        Command::Approve { role, actor_id, id, reason, name } => commands::decide::run(
            &config,
            ApprovalAction::Approve,
            &role,
            actor_id,
            id,
            &reason,
            &name,
        ),
        Command::Reject { role, actor_id, id, reason, name } => commands::decide::run(
            &config,
            ApprovalAction::Reject,
            &role,
            actor_id,
            id,
            &reason,
            &name,
        ),
        Command::Leaves { role, actor_id } => commands::leaves::list(&config, &role, actor_id),
        Command::LeaveAction { role, actor_id, id, action, name } => {
            match ApprovalAction::parse(&action) {
                Some(action) => {
                    commands::leaves::decide(&config, action, &role, actor_id, id, &name)
                }
                None => commands::CommandResult::failure(
                    "leave-action",
                    "invalid_action",
                    format!("unknown action `{action}` (expected approve or reject)"),
                    2,
                ),
            }
        }
        Command::ApplyLeave { employee_id, leave_type, from, to, half_day, reason } => {
            commands::leaves::apply(&config, employee_id, &leave_type, &from, &to, half_day, &reason)
        }
        Command::Balance { employee_id } => commands::leaves::balance(&config, employee_id),
        Command::MyLeaves { employee_id } => commands::leaves::my_leaves(&config, employee_id),
        Command::Config => commands::CommandResult {
            exit_code: 0,
            output: commands::config::run(&config),
        },
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match config.logging.format {
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}
