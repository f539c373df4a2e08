use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    plugweave::build!();

    Ok(())
}
