//! `modbound resolve` command

use anyhow::Result;

use crate::cli::ResolveArgs;
use crate::commands::{config_for, root_dir};
use modbound::ops::resolve_boundary;
use modbound::Resolution;

pub fn execute(args: ResolveArgs) -> Result<()> {
    let root = root_dir(args.root)?;
    let config = config_for(&root);

    match resolve_boundary(&config, &root, &args.dir)? {
        Resolution::Current(dir) => println!("{} (self)", dir.display()),
        Resolution::Ancestor(dir) => println!("{}", dir.display()),
        Resolution::NotFound => println!("none"),
    }

    Ok(())
}
