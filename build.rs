fn main() {
    println!("cargo:rerun-if-env-changed=AGITATOR_CONFIG");
    println!("cargo:rerun-if-env-changed=AGITATOR_BOOT_COMMAND");

    // ESP-IDF link arguments are only needed for the firmware binary.
    #[cfg(feature = "espidf")]
    embuild::espidf::sysenv::output();
}
