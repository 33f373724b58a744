use lambda_http::Error;
use checkout_desk::desk::controller::serve;
use checkout_desk::utils::okapi::setup_tracing;

// See https://docs.aws.amazon.com/lambda/latest/dg/lambda-rust.html
// https://docs.aws.amazon.com/lambda/latest/dg/rust-http-events.html

const DEV_MODE: bool = true;

#[tokio::main]
async fn main() -> Result<(), Error> {
    setup_tracing();
    serve(DEV_MODE).await
}
