fn main() {
    // option_env!() values are cached; rebuild when the baked-in defaults change.
    println!("cargo:rerun-if-env-changed=CAREERPATH_SUPABASE_URL");
    println!("cargo:rerun-if-env-changed=CAREERPATH_SUPABASE_KEY");
}
