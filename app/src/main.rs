use listkit::Application;
use todo_lists::{config, migrations, routes};

#[tokio::main]
async fn main() {
    let result = Application::new()
        .config(config::register_all)
        .routes(routes::register)
        .migrations::<migrations::Migrator>()
        .run()
        .await;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
