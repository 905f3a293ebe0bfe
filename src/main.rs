use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use live_detect::{cli, client, config, dashboard, error, logging, render, stream};
use cli::{Cli, Commands};
use client::BackendClient;
use config::Config;
use dashboard::Dashboard;
use error::Result;
use std::time::Duration;
use stream::{StreamOptions, StreamViewer};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let config = Config::load()?;
    let settings = config.with_overrides(cli.base_url.as_deref());

    match cli.command {
        Commands::Watch { width, height, interval_ms, ordering, upload, no_stream } => {
            let client = BackendClient::from_config(&settings)?;
            let ordering = ordering.unwrap_or(settings.ordering);
            let interval = interval_ms
                .map(|ms| Duration::from_millis(ms.max(1)))
                .unwrap_or_else(|| settings.poll_interval());

            println!("🔍 {}\n", render::TITLE);
            println!("  バックエンド: {}", client.endpoints().base());
            println!("  ポーリング間隔: {}ms / 応答順序: {}\n", interval.as_millis(), ordering);

            let (dashboard, mut events) = Dashboard::new(client, ordering);
            let poller = dashboard.start_polling(interval);

            let stream_task = if no_stream {
                None
            } else {
                println!("{}", render::LOADING_STREAM);
                Some(dashboard.start_stream(StreamOptions {
                    width: width.unwrap_or(settings.stream_width),
                    height: height.unwrap_or(settings.stream_height),
                    frame_limit: None,
                }))
            };

            for path in upload {
                dashboard.select_file(Some(path));
            }

            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    event = events.recv() => match event {
                        Some(event) => render::print_event(&event),
                        None => break,
                    },
                }
            }

            poller.shutdown();
            if let Some(task) = stream_task {
                task.abort();
            }
            dashboard.teardown();

            let final_list = dashboard.read(|s| s.detections().to_vec());
            println!("\n{}", render::format_detections("Detected Objects (All time)", &final_list));
            println!("\n✅ 終了");
        }

        Commands::Detections => {
            let client = BackendClient::from_config(&settings)?;
            let labels = client.fetch_detections().await?;
            println!("{}", render::format_detections("Detected Objects (All time)", &labels));
        }

        Commands::Upload { file } => {
            println!("📤 {} をアップロード中...", file.display());
            let client = BackendClient::from_config(&settings)?;
            let labels = client.upload_file(&file).await?;
            match render::format_upload_results(&labels) {
                Some(text) => println!("{}", text),
                None => println!("画像から物体は検出されませんでした"),
            }
        }

        Commands::Stream { frames, output, width, height } => {
            let client = BackendClient::from_config(&settings)?;
            let options = StreamOptions {
                width: width.unwrap_or(settings.stream_width),
                height: height.unwrap_or(settings.stream_height),
                frame_limit: frames,
            };
            println!("🎥 {}", client.endpoints().video(options.width, options.height));

            let spinner = ProgressBar::new_spinner();
            spinner.set_style(
                ProgressStyle::with_template("{spinner} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            spinner.enable_steady_tick(Duration::from_millis(120));
            spinner.set_message(render::LOADING_STREAM);

            let viewer = StreamViewer::new(client, options);
            let mut last_frame: Option<Vec<u8>> = None;
            let result = tokio::select! {
                result = viewer.run(|index, frame| {
                    if index == 0 {
                        match stream::frame_dimensions(frame) {
                            Some((w, h)) => spinner.println(format!("✔ 映像ストリーム受信開始 ({}x{})", w, h)),
                            None => spinner.println("✔ 映像ストリーム受信開始"),
                        }
                    }
                    spinner.set_message(format!("{} フレーム受信", index + 1));
                    last_frame = Some(frame.data.clone());
                }) => Some(result),
                _ = tokio::signal::ctrl_c() => None,
            };
            spinner.finish_and_clear();

            match result {
                Some(Err(e)) => {
                    eprintln!("❌ {}", live_detect_common::STREAM_ALERT_MESSAGE);
                    return Err(e);
                }
                Some(Ok(count)) => println!("✔ {}フレーム受信", count),
                None => println!("中断しました"),
            }

            if let (Some(path), Some(data)) = (output, last_frame) {
                std::fs::write(&path, data)?;
                println!("✔ 最後のフレームを保存: {}", path.display());
            }
        }

        Commands::Ping => {
            let client = BackendClient::from_config(&settings)?;
            let message = client.index().await?;
            println!("✔ {}: {}", client.endpoints().base(), message);
        }

        Commands::Config { set_base_url, show } => {
            let mut config = config;

            if let Some(url) = set_base_url {
                config.set_base_url(url)?;
                println!("✔ バックエンドURLを設定しました");
            }

            if show {
                println!("設定:");
                println!("  バックエンドURL: {}", config.base_url);
                println!("  ポーリング間隔: {}ms", config.poll_interval_ms);
                println!("  映像サイズ: {}x{}", config.stream_width, config.stream_height);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  応答順序: {}", config.ordering);
                if settings.base_url != config.base_url {
                    println!("  （実行時の上書き: {}）", settings.base_url);
                }
            }
        }
    }

    Ok(())
}
