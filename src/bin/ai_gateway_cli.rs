//! Minimal operator console for the gateway: probe status, send a one-shot
//! chat, pin a backend, or push a credential.

use std::env;
use std::process::ExitCode;

use ai_gateway::Gateway;
use tracing_subscriber::EnvFilter;

fn usage() -> ExitCode {
    eprintln!(
        "usage: ai-gateway-cli <command>\n\
         \n\
         commands:\n\
         \x20 status                         probe every backend\n\
         \x20 chat <prompt...>               dispatch one chat request\n\
         \x20 switch <backend>               pin dispatch to one backend\n\
         \x20 configure <backend> <cred>     apply a credential at runtime"
    );
    ExitCode::FAILURE
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let gateway = match Gateway::from_env() {
        Ok(g) => g,
        Err(e) => {
            eprintln!("failed to start gateway: {e}");
            return ExitCode::FAILURE;
        }
    };

    match args.split_first() {
        Some((cmd, rest)) => match (cmd.as_str(), rest) {
            ("status", _) => {
                for (name, available) in gateway.status().await {
                    println!("{name:>10}  {}", if available { "available" } else { "-" });
                }
                ExitCode::SUCCESS
            }
            ("chat", prompt) if !prompt.is_empty() => {
                let reply = gateway.chat(&prompt.join(" "), &[], None).await;
                if reply.success {
                    println!("[{}] {}", reply.origin, reply.content);
                    ExitCode::SUCCESS
                } else {
                    let detail = reply
                        .error
                        .map(|e| e.to_string())
                        .unwrap_or_else(|| "unknown error".into());
                    eprintln!("[{}] error: {detail}", reply.origin);
                    ExitCode::FAILURE
                }
            }
            ("switch", [backend]) => {
                if gateway.switch(backend).await {
                    println!("pinned to {backend}");
                    ExitCode::SUCCESS
                } else {
                    eprintln!("cannot switch to '{backend}': unknown or unavailable");
                    ExitCode::FAILURE
                }
            }
            ("configure", [backend, credential]) => {
                if gateway.configure(backend, credential).await {
                    println!("{backend} configured");
                    ExitCode::SUCCESS
                } else {
                    eprintln!("'{backend}' still unavailable after configure");
                    ExitCode::FAILURE
                }
            }
            _ => usage(),
        },
        None => usage(),
    }
}
