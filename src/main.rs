#[actix_web::main]
async fn main() -> std::io::Result<()> {
    hotelscope::app::run().await
}
