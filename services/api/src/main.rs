use talent_match_api::run;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("talent-match: {err}");
        std::process::exit(1);
    }
}
