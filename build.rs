fn main() {
    // ESP-IDF environment propagation is only needed for device builds;
    // host test builds run without the `espidf` feature.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
