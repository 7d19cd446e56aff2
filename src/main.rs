use anyhow::{bail, Context};
use clap::Parser;
use pumpflux::adapters::{ConsoleNavigator, FileStore, HttpClient};
use pumpflux::catalog::{visible_templates, TemplateFilter, TemplateQuery};
use pumpflux::cli::{Cli, Command, NodeTypeCommand};
use pumpflux::config::Settings;
use pumpflux::domain::{NodeTypeApi, NodeTypeDefinition, TemplateApi};
use pumpflux::favorites::FavoritesStore;
use pumpflux::notice::{Notice, NoticeLevel};
use pumpflux::preview::TemplatePreview;
use pumpflux::setup::SetupService;
use pumpflux::wizard::WizardStep;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so that --json output stays parseable
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::new_with_cli(&cli)?;
    debug!(base_url = %settings.api.base_url, "Loaded configuration");

    let client = HttpClient::new(&settings.api)?;
    let favorites_store = FileStore::new(&settings.storage.favorites_path);

    match cli.command {
        Command::Templates {
            search,
            category,
            complexity,
            sort,
            favorites,
            json,
        } => {
            let filter = TemplateFilter {
                search,
                category,
                complexity,
                favorites_only: favorites,
            };
            let favorites = FavoritesStore::load(favorites_store)?;
            let templates = client
                .list_templates(&TemplateQuery::from_filter(&filter, sort))
                .await?;
            let visible = visible_templates(&templates, &filter, sort, favorites.ids());

            if json {
                println!("{}", serde_json::to_string_pretty(&visible)?);
            } else if visible.is_empty() {
                println!("No templates found");
            } else {
                for template in visible {
                    let star = if favorites.contains(template.id) { "*" } else { " " };
                    println!(
                        "{} {:>4}  {:<40} {:<16} {}",
                        star,
                        template.id,
                        template.name,
                        template.category,
                        template.level().unwrap_or("-")
                    );
                }
            }
        }

        Command::Show { id, with_config } => {
            let template = client.get_template(id).await?;
            let preview = TemplatePreview::from_template(&template);
            print_preview(&preview);
            if with_config {
                println!("\nConfiguration:\n{}", TemplatePreview::config_dump(&template));
            }
        }

        Command::Favorite { id } => {
            let mut favorites = FavoritesStore::load(favorites_store)?;
            let notice = if favorites.toggle(id)? {
                Notice::success(format!("Added template {} to favorites", id))
            } else {
                Notice::info(format!("Removed template {} from favorites", id))
            };
            print_notice(&notice);
        }

        Command::Setup {
            id,
            name,
            credentials,
            fields,
            no_wizard,
            dry_run,
        } => {
            let service = SetupService::new(client, ConsoleNavigator::new(&settings.api.base_url));
            let mut setup = service.begin(id).await?;
            if let Some(name) = name {
                setup.set_name(name);
            }
            for (key, value) in credentials {
                if !setup.set_credential(&key, value) {
                    warn!("Template {} has no credential named '{}'", id, key);
                }
            }
            if !setup.credentials_complete() {
                bail!(
                    "Missing credentials: {} (pass them with --credential NAME=VALUE)",
                    setup.missing_credentials().join(", ")
                );
            }

            if !no_wizard {
                let mut wizard = service.wizard_for(&setup).await?;
                for assignment in &fields {
                    wizard.set_field(&assignment.node_id, &assignment.field, assignment.json_value())?;
                }
                while let WizardStep::Step(index) = wizard.step() {
                    if !wizard.next() {
                        for error in wizard.validation_errors() {
                            eprintln!("  {}", error);
                        }
                        bail!(
                            "Node {} of {} is not configured (set fields with --set NODE_ID.FIELD=VALUE)",
                            index + 1,
                            wizard.nodes().len()
                        );
                    }
                }

                let notice = wizard.submit(|_| Ok::<(), String>(()))?;
                info!("{}", notice.message);
                setup.replace_nodes(wizard.into_nodes());
            }

            if dry_run {
                println!("{}", serde_json::to_string_pretty(&setup.build_workflow()?)?);
            } else {
                let workflow = service.save(&setup).await?;
                print_notice(&Notice::success(format!(
                    "Created workflow {} ({})",
                    workflow.name, workflow.id
                )));
            }
        }

        Command::NodeTypes { action } => {
            run_node_types(&client, action.unwrap_or(NodeTypeCommand::List)).await?;
        }
    }

    Ok(())
}

async fn run_node_types(client: &HttpClient, action: NodeTypeCommand) -> anyhow::Result<()> {
    match action {
        NodeTypeCommand::List => {
            let definitions = client.list_node_types().await?;
            if definitions.is_empty() {
                println!("No node types defined");
            }
            for definition in definitions {
                println!(
                    "{:>4}  {:<32} {:<16} {} fields",
                    definition.id.map(|id| id.to_string()).unwrap_or_default(),
                    definition.name,
                    definition.service.as_ref().map(|s| s.as_str()).unwrap_or("-"),
                    definition.fields.len()
                );
            }
        }
        NodeTypeCommand::Show { id } => {
            let definition = client.get_node_type(id).await?;
            println!("{}", serde_json::to_string_pretty(&definition)?);
        }
        NodeTypeCommand::Create { file } => {
            let created = client.create_node_type(&read_definition(&file)?).await?;
            print_notice(&Notice::success(format!(
                "Created node type {} ({})",
                created.name,
                created.id.map(|id| id.to_string()).unwrap_or_default()
            )));
        }
        NodeTypeCommand::Update { id, file } => {
            let updated = client.update_node_type(id, &read_definition(&file)?).await?;
            print_notice(&Notice::success(format!("Updated node type {}", updated.name)));
        }
        NodeTypeCommand::Delete { id } => {
            client.delete_node_type(id).await?;
            print_notice(&Notice::success(format!("Deleted node type {}", id)));
        }
    }
    Ok(())
}

fn read_definition(path: &Path) -> anyhow::Result<NodeTypeDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid node type definition in {}", path.display()))
}

fn print_preview(preview: &TemplatePreview) {
    println!("{} (#{})", preview.name, preview.id);
    if !preview.description.is_empty() {
        println!("{}", preview.description);
    }
    println!(
        "Category: {}  Level: {}  Tags: {}",
        preview.category,
        preview.level.as_deref().unwrap_or("-"),
        preview.tags.join(", ")
    );

    println!("\nNodes:");
    for node in &preview.nodes {
        let service = node.service.as_ref().map(|s| s.display_name()).unwrap_or("-");
        println!(
            "  {:<12} {:<28} {:<16} {} ({} config keys)",
            node.id,
            node.label,
            service,
            node.operation.as_deref().unwrap_or(""),
            node.config_keys
        );
        if !node.missing_config.is_empty() {
            println!("    missing: {}", node.missing_config.join(", "));
        }
    }

    if !preview.edges.is_empty() {
        println!("\nConnections:");
        for edge in &preview.edges {
            match &edge.label {
                Some(label) => println!("  {} -> {} [{}]", edge.from, edge.to, label),
                None => println!("  {} -> {}", edge.from, edge.to),
            }
        }
    }

    if preview.needs_credentials() {
        println!("\nCredentials needed: {}", preview.placeholders.join(", "));
    }
}

fn print_notice(notice: &Notice) {
    match notice.level {
        NoticeLevel::Error => eprintln!("error: {}", notice.message),
        _ => println!("{}", notice.message),
    }
}
