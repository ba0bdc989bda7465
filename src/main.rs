#[rocket::launch]
fn app() -> _ {
    campaign_server::rocket()
}
