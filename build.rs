fn main() {
    // Only emit ESP-IDF link/env metadata when building the espidf feature;
    // host-side library/test builds need none of it.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
