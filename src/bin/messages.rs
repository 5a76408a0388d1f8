/// メッセージリソースHTTP Lambdaエントリポイント
///
/// API Gateway経由のHTTPリクエストを受け、GETでメッセージ取得、
/// POSTでメッセージ作成を行う。
use lambda_http::{run, service_fn, Body, Error, Request, Response};
use messages::application::MessageHandler;
use messages::infrastructure::{init_logging, DynamoMessageRepository, MessagesConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // 構造化ログを初期化
    init_logging();

    // DynamoDB設定はコールドスタート時に一度だけ読み込む
    let config = MessagesConfig::from_env().await.inspect_err(|err| {
        error!(error = %err, "設定の読み込みに失敗");
    })?;

    info!(table = config.table_name(), "メッセージLambda関数を初期化");

    let message_repo = DynamoMessageRepository::new(
        config.client().clone(),
        config.table_name().to_string(),
    );
    let message_handler = MessageHandler::new(message_repo);
    let message_handler = &message_handler;

    run(service_fn(move |request: Request| async move {
        Ok::<Response<Body>, Error>(message_handler.handle(request).await)
    }))
    .await
}
