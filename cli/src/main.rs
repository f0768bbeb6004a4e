//! GroveMap CLI — command-line surface over the cooldown core.
//!
//! One-shot commands execute against a locally constructed `Sys` and print
//! the response. `grove watch` stays alive: it re-arms expiry timers for
//! saved cooldowns, runs the fallback sweep, and prints an event line for
//! every decoration change until Ctrl-C.

use std::path::PathBuf;
use std::process;
use std::sync::{Arc, Mutex};

use grovemap_core::command::Command;
use grovemap_core::decor::events::DecorEvent;
use grovemap_core::decor::runtime::DecorRuntime;
use grovemap_core::response::Response;
use grovemap_core::sys::Sys;
use grovemap_core::view::format::format_left;


fn main() {
    init_tracing();

    let args: Vec<String> = std::env::args().collect();
    let arg_refs: Vec<&str> = args[1..].iter().map(|s| s.as_str()).collect();

    let cmd = match parse_args(&arg_refs) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("grove: {}", e);
            process::exit(1);
        }
    };

    let config_dir = resolve_config_dir();

    if cmd == Command::Watch {
        run_watch(config_dir);
        return;
    }

    let render_rows = cmd == Command::MarkersList;
    let mut sys = Sys::new(config_dir);
    let response = sys.execute(cmd);

    match response {
        Response::Ok { output } => {
            if render_rows {
                print_rows(&output);
            } else if !output.is_empty() {
                println!("{}", output);
            }
        }
        Response::Error { message } => {
            eprintln!("grove error: {}", message);
            process::exit(1);
        }
    }
}


/// Render the marker list as terminal rows instead of raw JSON.
fn print_rows(json: &str) {
    let rows: serde_json::Value = match serde_json::from_str(json) {
        Ok(rows) => rows,
        Err(_) => {
            println!("{}", json);
            return;
        }
    };
    let Some(rows) = rows.as_array() else {
        println!("{}", json);
        return;
    };
    for row in rows {
        let title = row["title"].as_str().unwrap_or("?");
        let status = row["status_label"].as_str().unwrap_or("");
        match row["remaining_label"].as_str() {
            Some(remaining) => println!("{}  {} ({})", title, status, remaining),
            None => println!("{}  {}", title, status),
        }
    }
}


fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}


fn resolve_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("GROVEMAP_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(base) = dirs::config_dir() {
        return base.join("grovemap");
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
    PathBuf::from(home).join(".config").join("grovemap")
}


fn parse_args(args: &[&str]) -> Result<Command, String> {
    if args.is_empty() {
        return Err("No command specified. Run 'grove help' for usage.".into());
    }

    match args[0] {
        "status" => Ok(Command::Status {
            format: args.get(1).and_then(|a| {
                if *a == "--json" { Some("json".into()) } else { None }
            }),
        }),
        "show" => {
            if args.len() < 2 {
                return Err("Usage: grove show <id>".into());
            }
            Ok(Command::MarkerShow { id: args[1].into() })
        }
        "markers" => parse_markers(args),
        "decorate" => {
            if args.len() < 2 {
                return Err("Usage: grove decorate <id>".into());
            }
            Ok(Command::Decorate { id: args[1].into() })
        }
        "cleanup" => Ok(Command::Cleanup),
        "reset" => Ok(Command::Reset),
        "watch" => Ok(Command::Watch),
        "help" => Ok(Command::Help {
            topic: args.get(1).map(|s| s.to_string()),
        }),
        _ => Err(format!("Unknown command: '{}'. Run 'grove help' for usage.", args[0])),
    }
}


fn parse_markers(args: &[&str]) -> Result<Command, String> {
    if args.len() < 2 {
        return Err("Usage: grove markers <list|reload>".into());
    }
    match args[1] {
        "list" => Ok(Command::MarkersList),
        "reload" => Ok(Command::MarkersReload),
        _ => Err(format!("Unknown markers subcommand: '{}'", args[1])),
    }
}


/// Live mode: keep timers armed and print decoration events as they happen.
fn run_watch(config_dir: PathBuf) {
    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("grove error: failed to start runtime: {}", e);
            process::exit(1);
        }
    };

    rt.block_on(async {
        let sys = Arc::new(Mutex::new(Sys::new(config_dir)));
        let runtime = DecorRuntime::new(sys);

        runtime.hub().subscribe(print_event);

        print_initial_state(&runtime);
        runtime.start();

        let _ = tokio::signal::ctrl_c().await;
        runtime.stop();
        println!("watch stopped");
    });
}


fn print_initial_state(runtime: &DecorRuntime) {
    let sys = runtime.sys().lock().unwrap();
    let now = grovemap_core::now_ms();
    // The slot may still carry lapsed entries at this point (cleanup runs
    // when the runtime starts), so count only cooldowns with time left.
    let live: Vec<(String, i64)> = sys
        .store()
        .active_ids()
        .into_iter()
        .filter_map(|id| {
            let left = sys.store().time_left_ms(&id, now);
            (left > 0).then_some((id, left))
        })
        .collect();
    println!(
        "watching {} markers, {} active cooldown(s)",
        sys.catalog().len(),
        live.len(),
    );
    for (id, left) in live {
        println!("  {} expires in {}", id, format_left(left));
    }
}


fn print_event(event: &DecorEvent) {
    match event {
        DecorEvent::Decorated { id, .. } => println!("decorated {}", id),
        DecorEvent::Expired { id } => println!("expired {}", id),
        DecorEvent::Reset { ids } => println!("reset ({} cleared)", ids.len()),
        // Tick events only occur while a popup is open; watch has none.
        DecorEvent::Tick { .. } => {}
    }
}
