use anyhow::{Context, Result, bail};
use catalogo_console::{
    AccessGate, Console, GateDecision,
    config::{AppConfig, Env},
    gate::VERIFYING_PLACEHOLDER,
    models::{Credentials, RegisterRequest},
    routes::{History, Route},
    views::{
        AutoConfirm, Confirm, DeleteOutcome,
        admin_categories::{AdminCategoriesView, CategoryForm},
        admin_products::{AdminProductsView, ProductForm, read_image},
        category::CategoryView,
        dashboard::DashboardView,
        home::HomeView,
        login::LoginView,
    },
};
use clap::{Args, Parser, Subcommand};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "catalogo")]
#[command(about = "Catalog storefront and admin console", long_about = None)]
struct Cli {
    /// Backend base URL (overrides CATALOGO_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Answer yes to every confirmation prompt
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog categories
    Catalog,
    /// Show a category and its products
    Category { id: String },
    /// Open a page by path, e.g. `/categoria/<id>` or `/admin/productos`
    Open { path: String },
    /// Sign in and keep the session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a backend account
    Register {
        #[arg(long)]
        nombre: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// Administration pages (sign-in required)
    Admin {
        #[command(subcommand)]
        page: AdminPage,
    },
}

#[derive(Subcommand)]
enum AdminPage {
    /// Admin landing page
    Dashboard,
    /// Manage categories
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Manage products
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    List,
    Create(CategoryFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: CategoryFields,
    },
    Delete {
        id: String,
    },
}

#[derive(Args)]
struct CategoryFields {
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    descripcion: Option<String>,
    #[arg(long)]
    orden: Option<i32>,
}

#[derive(Subcommand)]
enum ProductAction {
    List,
    Create(ProductFields),
    Update {
        id: String,
        #[command(flatten)]
        fields: ProductFields,
    },
    Delete {
        id: String,
    },
    /// Show or hide a product in the public catalog
    Toggle {
        id: String,
    },
    /// Upload an image and print its stored path
    Upload {
        path: PathBuf,
    },
}

#[derive(Args)]
struct ProductFields {
    #[arg(long)]
    nombre: Option<String>,
    #[arg(long)]
    precio: Option<String>,
    #[arg(long)]
    descripcion: Option<String>,
    /// Category id
    #[arg(long)]
    categoria: Option<String>,
    /// Image path returned by `upload`
    #[arg(long)]
    imagen: Option<String>,
    /// Comma-separated sizes, e.g. "S, M, L"
    #[arg(long)]
    talles: Option<String>,
    #[arg(long)]
    visible: Option<bool>,
}

/// StdinConfirm
///
/// Asks on stderr and reads a y/N answer from stdin.
struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        eprint!("{prompt} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// main
///
/// Loads configuration, sets up logging, restores the session and runs one command.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    let mut config = AppConfig::load();
    if let Some(api_url) = cli.api_url.clone() {
        config = config.with_api_url(api_url);
    }
    init_logging(&config);

    let console = Console::new(config).context("could not build the API client")?;
    tracing::debug!(api = %console.config.api_url, "console starting");

    // The session is restored once, before any page is shown.
    console.session.initialize().await;

    let confirm: Box<dyn Confirm> = if cli.yes {
        Box::new(AutoConfirm(true))
    } else {
        Box::new(StdinConfirm)
    };

    run(&console, cli.command, confirm.as_ref()).await
}

/// init_logging
///
/// Pretty logs locally, JSON lines in production. Both go to stderr so stdout only carries
/// page output.
fn init_logging(config: &AppConfig) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalogo_console=info,catalogo=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
                .init();
        }
    }
}

async fn run(console: &Console, command: Commands, confirm: &dyn Confirm) -> Result<()> {
    match command {
        Commands::Catalog => render_route(console, &Route::Home).await,
        Commands::Category { id } => render_route(console, &Route::Category(id)).await,
        Commands::Open { path } => {
            let Some(route) = Route::parse(&path) else {
                bail!("No page at {path}");
            };
            if route.is_protected() {
                guard(console, &route).await?;
            }
            render_route(console, &route).await;
        }
        Commands::Login { email, password } => {
            let navigation = LoginView::new(&console.session)
                .submit(&Credentials { email, password })
                .await?;
            println!("Signed in. Next: {}", navigation.to);
        }
        Commands::Register {
            nombre,
            email,
            password,
        } => {
            let request = RegisterRequest {
                nombre,
                email,
                password,
            };
            let ack = console.api.register(&request).await.map_err(|err| {
                anyhow::anyhow!(err.message_or("Error creating the account"))
            })?;
            println!("{}", ack.mensaje.unwrap_or_else(|| "Account created".to_string()));
        }
        Commands::Logout => {
            let navigation = DashboardView::logout(&console.session).await;
            println!("Signed out. Next: {}", navigation.to);
        }
        Commands::Whoami => match console.session.snapshot().identity {
            Some(identity) => println!("{}", identity.nombre),
            None => println!("Not signed in"),
        },
        Commands::Admin { page } => {
            let route = match &page {
                AdminPage::Dashboard => Route::Dashboard,
                AdminPage::Categories { .. } => Route::AdminCategories,
                AdminPage::Products { .. } => Route::AdminProducts,
            };
            guard(console, &route).await?;
            run_admin(console, page, confirm).await?;
        }
    }
    Ok(())
}

/// guard
///
/// Settles the access gate for a protected route. A redirect is reported once and the
/// command stops there.
async fn guard(console: &Console, route: &Route) -> Result<()> {
    let mut gate = AccessGate::new();
    let mut sessions = console.session.subscribe();

    if console.session.snapshot().is_loading() {
        eprintln!("{VERIFYING_PLACEHOLDER}");
    }
    match gate.settle(&mut sessions).await {
        GateDecision::Allow => Ok(()),
        GateDecision::Redirect(navigation) => {
            let mut history = History::new(route.clone());
            let target = history.navigate(navigation);
            bail!("{route} requires signing in: go to {target}")
        }
        GateDecision::Loading => bail!("session could not be verified"),
    }
}

/// render_route
///
/// Prints the read-only page behind a route. Protected routes must be guarded first.
async fn render_route(console: &Console, route: &Route) {
    match route {
        Route::Home => {
            let state = HomeView::new(console.api.clone()).load().await;
            println!("{}", HomeView::render(&state));
        }
        Route::Category(id) => {
            let view = CategoryView::new(console.api.clone());
            let state = view.load(id).await;
            println!("{}", view.render(&state));
        }
        Route::Login => {
            println!("Sign in with: catalogo login --email <email> --password <password>");
        }
        Route::Dashboard => {
            println!("{}", DashboardView::render(&console.session.snapshot()));
        }
        Route::AdminCategories => {
            let view = AdminCategoriesView::new(console.api.clone());
            println!("{}", AdminCategoriesView::render(&view.load().await));
        }
        Route::AdminProducts => {
            let view = AdminProductsView::new(console.api.clone());
            println!("{}", view.render(&view.load().await));
        }
    }
}

async fn run_admin(console: &Console, page: AdminPage, confirm: &dyn Confirm) -> Result<()> {
    match page {
        AdminPage::Dashboard => render_route(console, &Route::Dashboard).await,
        AdminPage::Categories { action } => {
            run_categories(console, action, confirm).await?;
        }
        AdminPage::Products { action } => {
            run_products(console, action, confirm).await?;
        }
    }
    Ok(())
}

async fn run_categories(
    console: &Console,
    action: CategoryAction,
    confirm: &dyn Confirm,
) -> Result<()> {
    let view = AdminCategoriesView::new(console.api.clone());
    match action {
        CategoryAction::List => {
            println!("{}", AdminCategoriesView::render(&view.load().await));
        }
        CategoryAction::Create(fields) => {
            let form = fields.apply(CategoryForm::default());
            let category = view.save(None, &form).await?;
            println!("Created category {} ({})", category.nombre, category.id);
        }
        CategoryAction::Update { id, fields } => {
            let current = console
                .api
                .get_category(&id)
                .await
                .map_err(|err| anyhow::anyhow!(err.message_or("Category not found")))?;
            let form = fields.apply(CategoryForm::from_category(&current));
            let category = view.save(Some(&id), &form).await?;
            println!("Updated category {} ({})", category.nombre, category.id);
        }
        CategoryAction::Delete { id } => {
            let nombre = match console.api.get_category(&id).await {
                Ok(category) => category.nombre,
                Err(_) => id.clone(),
            };
            report_delete(view.delete(&id, &nombre, confirm).await)?;
        }
    }
    Ok(())
}

async fn run_products(
    console: &Console,
    action: ProductAction,
    confirm: &dyn Confirm,
) -> Result<()> {
    let view = AdminProductsView::new(console.api.clone());
    match action {
        ProductAction::List => {
            println!("{}", view.render(&view.load().await));
        }
        ProductAction::Create(fields) => {
            let form = fields.apply(ProductForm::default());
            let product = view.save(None, &form).await?;
            println!("Created product {} ({})", product.nombre, product.id);
        }
        ProductAction::Update { id, fields } => {
            // The admin listing is the only one that includes hidden products.
            let products = console
                .api
                .list_all_products()
                .await
                .map_err(|err| anyhow::anyhow!(err.message_or("Could not load products")))?;
            let Some(current) = products.iter().find(|product| product.id == id) else {
                bail!("Product {id} not found");
            };
            let form = fields.apply(ProductForm::from_product(current));
            let product = view.save(Some(&id), &form).await?;
            println!("Updated product {} ({})", product.nombre, product.id);
        }
        ProductAction::Delete { id } => {
            let nombre = match console.api.get_product(&id).await {
                Ok(product) => product.nombre,
                Err(_) => id.clone(),
            };
            report_delete(view.delete(&id, &nombre, confirm).await)?;
        }
        ProductAction::Toggle { id } => {
            view.toggle_visibility(&id).await?;
            println!("Visibility changed for {id}");
        }
        ProductAction::Upload { path } => {
            let upload = read_image(&path)
                .await
                .with_context(|| format!("could not read {}", path.display()))?;
            let stored = view.upload_image(upload).await?;
            println!("{stored}");
        }
    }
    Ok(())
}

fn report_delete(outcome: DeleteOutcome) -> Result<()> {
    match outcome {
        DeleteOutcome::Deleted => println!("Deleted"),
        DeleteOutcome::Cancelled => println!("Cancelled"),
        DeleteOutcome::Failed(alert) => bail!(alert),
    }
    Ok(())
}

impl CategoryFields {
    fn apply(self, mut form: CategoryForm) -> CategoryForm {
        if let Some(nombre) = self.nombre {
            form.nombre = nombre;
        }
        if let Some(descripcion) = self.descripcion {
            form.descripcion = descripcion;
        }
        if let Some(orden) = self.orden {
            form.orden = orden;
        }
        form
    }
}

impl ProductFields {
    fn apply(self, mut form: ProductForm) -> ProductForm {
        if let Some(nombre) = self.nombre {
            form.nombre = nombre;
        }
        if let Some(precio) = self.precio {
            form.precio = precio;
        }
        if let Some(descripcion) = self.descripcion {
            form.descripcion = descripcion;
        }
        if let Some(categoria) = self.categoria {
            form.categoria = categoria;
        }
        if let Some(imagen) = self.imagen {
            form.imagen = imagen;
        }
        if let Some(talles) = self.talles {
            form.talles = talles;
        }
        if let Some(visible) = self.visible {
            form.visible = visible;
        }
        form
    }
}
