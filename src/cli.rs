use clap::{Parser, Subcommand};
use live_detect_common::ResponseOrdering;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "live-detect")]
#[command(about = "ライブ物体検出ダッシュボード（CLIクライアント）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// バックエンドのURL（環境変数 LIVE_DETECT_BASE_URL・設定ファイルより優先）
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 検出一覧のポーリングと映像ストリームを同時に表示（Ctrl-Cで終了）
    Watch {
        /// 映像の幅
        #[arg(long)]
        width: Option<u32>,

        /// 映像の高さ
        #[arg(long)]
        height: Option<u32>,

        /// ポーリング間隔（ミリ秒）
        #[arg(long)]
        interval_ms: Option<u64>,

        /// 重なった応答の扱い (last-resolved/latest-issued)
        #[arg(long)]
        ordering: Option<ResponseOrdering>,

        /// 起動直後にアップロードする画像（複数指定可）
        #[arg(short, long)]
        upload: Vec<PathBuf>,

        /// 映像ストリームを受信しない
        #[arg(long)]
        no_stream: bool,
    },

    /// 検出一覧を1回だけ取得
    Detections,

    /// 画像をアップロードして検出結果を表示
    Upload {
        /// 画像ファイル
        #[arg(required = true)]
        file: PathBuf,
    },

    /// 映像ストリームを受信
    Stream {
        /// 受信するフレーム数（省略時はCtrl-Cまで）
        #[arg(short = 'n', long)]
        frames: Option<usize>,

        /// 最後に受信したフレームの保存先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 映像の幅
        #[arg(long)]
        width: Option<u32>,

        /// 映像の高さ
        #[arg(long)]
        height: Option<u32>,
    },

    /// バックエンドの疎通確認
    Ping,

    /// 設定を表示/編集
    Config {
        /// バックエンドURLを保存
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
