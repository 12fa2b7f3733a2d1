#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cutbench_shell::run().await
}
