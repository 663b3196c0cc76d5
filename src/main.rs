use readaloud::{
    api,
    assembly::FfmpegAssembler,
    config::Config,
    extract::{Ocr, TesseractOcr},
    logging,
    pipeline::TtsPipeline,
    synthesis::{OpenAiSpeech, SpeechBackend},
};
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let config = Arc::new(Config::from_env().expect("Failed to load config from environment"));
    logging::init_tracing();
    tracing::debug!(
        speech_api = %config.speech_api_url,
        model = %config.tts_model,
        chunk_size = config.chunk_size,
        server_port = ?config.server_port,
        "Loaded configuration"
    );

    let speech: Arc<dyn SpeechBackend> = Arc::new(OpenAiSpeech::new(
        &config.speech_api_url,
        &config.api_key,
        &config.tts_model,
    ));
    let ocr: Arc<dyn Ocr> = Arc::new(TesseractOcr::new(&config.tesseract_path));
    let assembler = Arc::new(FfmpegAssembler::new(&config.ffmpeg_path));
    let pipeline = TtsPipeline::new(Arc::clone(&config), ocr, speech, assembler);
    let app = api::create_router(Arc::new(pipeline), &config);

    let (listener, port) = bind_listener(&config).await.expect("Failed to bind listener");
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app).await.unwrap();
}

async fn bind_listener(config: &Config) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = config.server_port {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
