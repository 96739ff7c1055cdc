use super::args::{BinlogsCommand, Cli, Commands, IndexCommand, StalksCommand};
use super::handlers;
use anyhow::{Context, Result};
use dbagent_runtime::{AgentConfig, Collaborators, DatabaseServer, resolve_agent_dir};

pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    tracing::debug!(mariadb_dir = %config.mariadb_dir.display(), "loaded config");

    let collaborators = Collaborators::system(&config);
    let server = DatabaseServer::new(config, collaborators);

    match cli.command {
        Commands::Binlogs { command } => match command {
            BinlogsCommand::List => handlers::binlogs::list(&server),
            BinlogsCommand::Current => handlers::binlogs::current(&server),
            BinlogsCommand::Snapshot => handlers::binlogs::snapshot(&server),
        },

        Commands::Search {
            binlog,
            database,
            start,
            stop,
            pattern,
            max_lines,
        } => handlers::binlogs::search(&server, &binlog, &database, &start, &stop, &pattern, max_lines),

        Commands::Purge { to_binlog, target } => {
            handlers::binlogs::purge(&server, &target, &to_binlog)
        }

        Commands::Index { command } => match command {
            IndexCommand::Add { binlogs } => handlers::index::add(&server, &binlogs),
            IndexCommand::Remove { binlogs } => handlers::index::remove(&server, &binlogs),
            IndexCommand::Timeline {
                start,
                end,
                database,
                kind,
            } => handlers::index::timeline(&server, start, end, database.as_deref(), kind.as_deref()),
            IndexCommand::RowIds {
                start,
                end,
                kind,
                database,
                table,
                search,
            } => handlers::index::row_ids(
                &server,
                start,
                end,
                &kind,
                &database,
                table.as_deref(),
                search.as_deref(),
            ),
            IndexCommand::Queries { database, row_ids } => {
                handlers::index::queries(&server, &database, &row_ids)
            }
        },

        Commands::Archive { binlogs, offsite } => {
            handlers::archive::upload(&server, &binlogs, &offsite)
        }

        Commands::Processes { target } => handlers::diagnostics::processes(&server, &target),
        Commands::Variables { target } => handlers::diagnostics::variables(&server, &target),
        Commands::Locks { target } => handlers::diagnostics::locks(&server, &target),
        Commands::Kill { threshold, target } => {
            handlers::diagnostics::kill(&server, &target, threshold)
        }
        Commands::Deadlocks {
            database,
            start,
            stop,
            max_lines,
            target,
        } => handlers::diagnostics::deadlocks(&server, &target, &database, &start, &stop, max_lines),
        Commands::Explain {
            database,
            query,
            target,
        } => handlers::diagnostics::explain(&server, &target, &database, &query),
        Commands::ColumnStats {
            schema,
            table,
            doc_name,
            target,
        } => handlers::diagnostics::column_stats(&server, &target, &schema, &table, &doc_name),

        Commands::Stalks { command } => match command {
            StalksCommand::List => handlers::stalks::list(&server),
            StalksCommand::Show { name } => handlers::stalks::show(&server, &name),
        },
    }
}

fn load_config(cli: &Cli) -> Result<AgentConfig> {
    let path = match &cli.config {
        Some(path) => path.clone(),
        None => AgentConfig::default_path(&resolve_agent_dir(None)?),
    };

    AgentConfig::load_from(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
