//! Retrieves information about the version of the crate from Git and the build
//! environment. This information is then written to a file in the output
//! directory and can be accessed at runtime by the demo driver.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
