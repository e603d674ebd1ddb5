fn main() {
    // Only the espidf feature pulls in the ESP-IDF toolchain; plain host
    // builds (tests) must not require an IDF environment.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
