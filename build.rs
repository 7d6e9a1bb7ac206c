fn main() {
    // Forwards ESP-IDF environment metadata when building for espidf;
    // a no-op on host builds.
    embuild::espidf::sysenv::output();
}
