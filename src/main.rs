//! ems-cli - command-line client for the Employee Management System

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ems_cli::api::{self, client::EmsClient};
use ems_cli::auth::access::{self, Action, Resource};
use ems_cli::auth::tokens::jwt_expiry;
use ems_cli::auth::{AuthService, SessionStore};
use ems_cli::config::ClientConfig;
use ems_cli::models::{Page, PageQuery, UserRole};

#[derive(Parser)]
#[command(name = "ems-cli")]
#[command(about = "Command-line client for the Employee Management System", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the configured API base URL
    #[arg(long, global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        username: String,
        password: String,
    },

    /// Log out and clear the stored session
    Logout,

    /// Show current session status
    Status,

    /// Show the cached user profile
    Whoami,

    /// Create a user account (SYSTEM_ADMIN only)
    Register {
        username: String,
        email: String,
        password: String,

        /// Role for the new account: SYSTEM_ADMIN or HR_MANAGER
        #[arg(long, default_value = "HR_MANAGER")]
        role: String,
    },

    /// Redeem an activation token and set the initial password
    Activate { token: String, password: String },

    /// Request a password-reset email
    ForgotPassword { email: String },

    /// Redeem a reset token and set a new password
    ResetPassword { token: String, password: String },

    /// Show or change client configuration
    Config {
        /// Set the API base URL
        #[arg(long)]
        set_url: Option<String>,
    },

    /// Manage employees
    Employees {
        #[command(subcommand)]
        command: EmployeeCommand,
    },

    /// Manage departments
    Departments {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Manage office locations
    Locations {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Manage projects
    Projects {
        #[command(subcommand)]
        command: ResourceCommand,
    },

    /// Manage project tasks
    Tasks {
        #[command(subcommand)]
        command: ResourceCommand,
    },
}

#[derive(Subcommand)]
enum ResourceCommand {
    /// List a page of records
    List {
        #[arg(long, default_value = "0")]
        page: u32,

        #[arg(long, default_value = "20")]
        size: u32,

        /// Field to sort by
        #[arg(long)]
        sort_by: Option<String>,

        /// ASC or DESC
        #[arg(long, default_value = "ASC")]
        sort_dir: String,
    },

    /// Fetch one record by id
    Get { id: String },

    /// Create a record from a JSON body (the server validates fields)
    Create { body: String },

    /// Update a record from a JSON body
    Update { id: String, body: String },

    /// Delete a record
    Delete { id: String },
}

#[derive(Subcommand)]
enum EmployeeCommand {
    #[command(flatten)]
    Common(ResourceCommand),

    /// Typeahead search, optionally scoped to a department
    Search {
        /// Name fragment to match
        #[arg(short, long)]
        q: Option<String>,

        #[arg(long)]
        department_id: Option<String>,

        /// Employee id to leave out of the results
        #[arg(long)]
        exclude_id: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let mut config = ClientConfig::load()?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let store = Arc::new(SessionStore::open_default());
    let auth = Arc::new(AuthService::new(config.api_base_url.clone(), store.clone()));

    // Proactive expiry check for commands that ride on the session
    if uses_session(&cli.command) {
        auth.initialize().await;
    }

    let client = EmsClient::new(auth.clone());

    match cli.command {
        Commands::Login { username, password } => {
            let session = auth.login(&username, &password).await?;
            println!(
                "Logged in as {} ({})",
                session.user.username, session.user.role
            );
        }
        Commands::Logout => {
            auth.logout().await;
            println!("Logged out.");
        }
        Commands::Status => {
            status(&store);
        }
        Commands::Whoami => {
            whoami(&store)?;
        }
        Commands::Register {
            username,
            email,
            password,
            role,
        } => {
            let role = UserRole::from_str(&role).map_err(anyhow::Error::msg)?;
            if !UserRole::admin_creatable().contains(&role) {
                bail!("Role {role} cannot be provisioned directly; use the activation flow.");
            }
            if let Some(user) = store.user() {
                if !access::is_allowed(user.role, Resource::Users, Action::Create) {
                    bail!("Creating accounts requires the SYSTEM_ADMIN role.");
                }
            }
            let user = api::users::register(&client, &username, &email, &password, role).await?;
            println!("Created user {} ({})", user.username, user.role);
        }
        Commands::Activate { token, password } => {
            auth.activate_account(&token, &password).await?;
            println!("Account activated. You can now log in.");
        }
        Commands::ForgotPassword { email } => {
            auth.forgot_password(&email).await?;
            println!("If the address is known, a reset email is on its way.");
        }
        Commands::ResetPassword { token, password } => {
            auth.reset_password(&token, &password).await?;
            println!("Password updated. You can now log in.");
        }
        Commands::Config { set_url } => match set_url {
            Some(url) => {
                config.api_base_url = url;
                config.save()?;
                println!("API base URL set to {}", config.api_base_url);
            }
            None => {
                println!("api_base_url: {}", config.api_base_url);
            }
        },
        Commands::Employees { command } => match command {
            EmployeeCommand::Common(command) => {
                run_employees(&client, &store, command).await?;
            }
            EmployeeCommand::Search {
                q,
                department_id,
                exclude_id,
            } => {
                let hits = api::employees::search(
                    &client,
                    q.as_deref(),
                    department_id.as_deref(),
                    exclude_id.as_deref(),
                )
                .await?;
                for e in &hits {
                    println!(
                        "{}  {}  {}",
                        e.id,
                        e.full_name(),
                        e.department_name.as_deref().unwrap_or("-")
                    );
                }
                println!("{} match(es)", hits.len());
            }
        },
        Commands::Departments { command } => {
            run_departments(&client, &store, command).await?;
        }
        Commands::Locations { command } => {
            run_locations(&client, &store, command).await?;
        }
        Commands::Projects { command } => {
            run_projects(&client, &store, command).await?;
        }
        Commands::Tasks { command } => {
            run_tasks(&client, &store, command).await?;
        }
    }

    Ok(())
}

/// Commands that ride on an existing session and so benefit from the
/// startup refresh. Login and the account-recovery flows do not.
fn uses_session(command: &Commands) -> bool {
    !matches!(
        command,
        Commands::Login { .. }
            | Commands::Logout
            | Commands::Activate { .. }
            | Commands::ForgotPassword { .. }
            | Commands::ResetPassword { .. }
            | Commands::Config { .. }
    )
}

fn status(store: &SessionStore) {
    match store.session() {
        Some(session) => {
            let exp = jwt_expiry(&session.token).or(session.expires_at);
            match exp {
                Some(exp) if ems_cli::auth::tokens::unix_now() < exp => {
                    let when = chrono::DateTime::from_timestamp(exp as i64, 0)
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| exp.to_string());
                    println!("Access token: valid");
                    println!("  expires_at: {when}");
                }
                Some(_) => println!("Access token: expired"),
                None => println!("Access token: present (no expiry claim)"),
            }
            println!("Refresh tok:  present");
            println!(
                "User:         {} ({})",
                session.user.username, session.user.role
            );
        }
        None => {
            println!("Access token: none");
            println!("Refresh tok:  none");
            println!("\nRun 'ems-cli login <username> <password>' to authenticate.");
        }
    }
}

fn whoami(store: &SessionStore) -> Result<()> {
    let user = store
        .user()
        .context("Not logged in. Run 'ems-cli login' first.")?;
    println!("Username:  {}", user.username);
    println!("Email:     {}", user.email);
    println!("Role:      {}", user.role);
    println!("ID:        {}", user.id);
    println!(
        "Employee:  {}",
        user.employee_id.as_deref().unwrap_or("(not linked)")
    );
    println!(
        "Last login: {}",
        user.last_login.as_deref().unwrap_or("(none)")
    );
    Ok(())
}

/// Advisory pre-check: the server still decides, and may allow
/// ownership-conditional operations this matrix knows nothing about.
fn warn_if_denied(store: &SessionStore, resource: Resource, action: Action) {
    if let Some(user) = store.user() {
        if !access::is_allowed(user.role, resource, action) {
            tracing::warn!(
                "Role {} has no unconditional grant for this operation; the server will decide",
                user.role
            );
        }
    }
}

fn parse_body(raw: &str) -> Result<serde_json::Value> {
    serde_json::from_str(raw).context("Request body is not valid JSON")
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_page_footer<T>(page: &Page<T>) {
    println!(
        "page {}/{}  ({} total)",
        page.page + 1,
        page.total_pages.max(1),
        page.total_elements
    );
}

async fn run_employees(
    client: &EmsClient,
    store: &SessionStore,
    command: ResourceCommand,
) -> Result<()> {
    let resource = Resource::Employees;
    match command {
        ResourceCommand::List {
            page,
            size,
            sort_by,
            sort_dir,
        } => {
            let result =
                api::employees::query(client, &PageQuery::new(page, size, sort_by, sort_dir))
                    .await?;
            for e in &result.content {
                println!(
                    "{}  {}  {}  {}",
                    e.id,
                    e.full_name(),
                    e.designation,
                    e.department_name.as_deref().unwrap_or("-")
                );
            }
            print_page_footer(&result);
        }
        ResourceCommand::Get { id } => {
            print_json(&api::employees::get(client, &id).await?)?;
        }
        ResourceCommand::Create { body } => {
            warn_if_denied(store, resource, Action::Create);
            let e = api::employees::create(client, &parse_body(&body)?).await?;
            println!("Created employee {} ({})", e.full_name(), e.id);
        }
        ResourceCommand::Update { id, body } => {
            warn_if_denied(store, resource, Action::Update);
            let e = api::employees::update(client, &id, &parse_body(&body)?).await?;
            println!("Updated employee {} ({})", e.full_name(), e.id);
        }
        ResourceCommand::Delete { id } => {
            warn_if_denied(store, resource, Action::Delete);
            api::employees::delete(client, &id).await?;
            println!("Deleted employee {id}");
        }
    }
    Ok(())
}

async fn run_departments(
    client: &EmsClient,
    store: &SessionStore,
    command: ResourceCommand,
) -> Result<()> {
    let resource = Resource::Departments;
    match command {
        ResourceCommand::List {
            page,
            size,
            sort_by,
            sort_dir,
        } => {
            let result =
                api::departments::query(client, &PageQuery::new(page, size, sort_by, sort_dir))
                    .await?;
            for d in &result.content {
                println!(
                    "{}  {}  head: {}  budget: {}",
                    d.id,
                    d.name,
                    d.department_head_name.as_deref().unwrap_or("-"),
                    d.budget
                );
            }
            print_page_footer(&result);
        }
        ResourceCommand::Get { id } => {
            print_json(&api::departments::get(client, &id).await?)?;
        }
        ResourceCommand::Create { body } => {
            warn_if_denied(store, resource, Action::Create);
            let d = api::departments::create(client, &parse_body(&body)?).await?;
            println!("Created department {} ({})", d.name, d.id);
        }
        ResourceCommand::Update { id, body } => {
            warn_if_denied(store, resource, Action::Update);
            let d = api::departments::update(client, &id, &parse_body(&body)?).await?;
            println!("Updated department {} ({})", d.name, d.id);
        }
        ResourceCommand::Delete { id } => {
            warn_if_denied(store, resource, Action::Delete);
            api::departments::delete(client, &id).await?;
            println!("Deleted department {id}");
        }
    }
    Ok(())
}

async fn run_locations(
    client: &EmsClient,
    store: &SessionStore,
    command: ResourceCommand,
) -> Result<()> {
    let resource = Resource::Locations;
    match command {
        ResourceCommand::List {
            page,
            size,
            sort_by,
            sort_dir,
        } => {
            let result =
                api::locations::query(client, &PageQuery::new(page, size, sort_by, sort_dir))
                    .await?;
            for l in &result.content {
                println!("{}  {}  {}, {}", l.id, l.name, l.city, l.country);
            }
            print_page_footer(&result);
        }
        ResourceCommand::Get { id } => {
            print_json(&api::locations::get(client, &id).await?)?;
        }
        ResourceCommand::Create { body } => {
            warn_if_denied(store, resource, Action::Create);
            let l = api::locations::create(client, &parse_body(&body)?).await?;
            println!("Created location {} ({})", l.name, l.id);
        }
        ResourceCommand::Update { id, body } => {
            warn_if_denied(store, resource, Action::Update);
            let l = api::locations::update(client, &id, &parse_body(&body)?).await?;
            println!("Updated location {} ({})", l.name, l.id);
        }
        ResourceCommand::Delete { id } => {
            warn_if_denied(store, resource, Action::Delete);
            api::locations::delete(client, &id).await?;
            println!("Deleted location {id}");
        }
    }
    Ok(())
}

async fn run_projects(
    client: &EmsClient,
    store: &SessionStore,
    command: ResourceCommand,
) -> Result<()> {
    let resource = Resource::Projects;
    match command {
        ResourceCommand::List {
            page,
            size,
            sort_by,
            sort_dir,
        } => {
            let result =
                api::projects::query(client, &PageQuery::new(page, size, sort_by, sort_dir))
                    .await?;
            for p in &result.content {
                let tasks = p
                    .task_counts
                    .as_ref()
                    .map(|t| format!("{}/{}/{}", t.open, t.in_progress, t.closed))
                    .unwrap_or_else(|| "-".to_string());
                println!(
                    "{}  {}  {}  tasks(o/i/c): {}",
                    p.id, p.name, p.status, tasks
                );
            }
            print_page_footer(&result);
        }
        ResourceCommand::Get { id } => {
            print_json(&api::projects::get(client, &id).await?)?;
        }
        ResourceCommand::Create { body } => {
            warn_if_denied(store, resource, Action::Create);
            let p = api::projects::create(client, &parse_body(&body)?).await?;
            println!("Created project {} ({})", p.name, p.id);
        }
        ResourceCommand::Update { id, body } => {
            warn_if_denied(store, resource, Action::Update);
            let p = api::projects::update(client, &id, &parse_body(&body)?).await?;
            println!("Updated project {} ({})", p.name, p.id);
        }
        ResourceCommand::Delete { id } => {
            warn_if_denied(store, resource, Action::Delete);
            api::projects::delete(client, &id).await?;
            println!("Deleted project {id}");
        }
    }
    Ok(())
}

async fn run_tasks(
    client: &EmsClient,
    store: &SessionStore,
    command: ResourceCommand,
) -> Result<()> {
    let resource = Resource::Tasks;
    match command {
        ResourceCommand::List {
            page,
            size,
            sort_by,
            sort_dir,
        } => {
            let result =
                api::tasks::query(client, &PageQuery::new(page, size, sort_by, sort_dir)).await?;
            for t in &result.content {
                println!(
                    "{}  {}  {}  due: {}",
                    t.id,
                    t.name,
                    t.status.as_deref().unwrap_or("-"),
                    t.due_date.as_deref().unwrap_or("-")
                );
            }
            print_page_footer(&result);
        }
        ResourceCommand::Get { id } => {
            print_json(&api::tasks::get(client, &id).await?)?;
        }
        ResourceCommand::Create { body } => {
            warn_if_denied(store, resource, Action::Create);
            let t = api::tasks::create(client, &parse_body(&body)?).await?;
            println!("Created task {} ({})", t.name, t.id);
        }
        ResourceCommand::Update { id, body } => {
            warn_if_denied(store, resource, Action::Update);
            let t = api::tasks::update(client, &id, &parse_body(&body)?).await?;
            println!("Updated task {} ({})", t.name, t.id);
        }
        ResourceCommand::Delete { id } => {
            warn_if_denied(store, resource, Action::Delete);
            api::tasks::delete(client, &id).await?;
            println!("Deleted task {id}");
        }
    }
    Ok(())
}
