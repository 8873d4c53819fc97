use std::path::PathBuf;

use clap::Args;
use serde::Serialize;

use refswap::asset::{self, AssetHandle};
use refswap::corpus::ContentLocation;
use refswap::local_files::{self, FileSystem};
use refswap::ObjectIdentity;

use super::CmdResult;

#[derive(Args)]
pub struct IdentityArgs {
    /// Asset file whose .meta holds the guid
    pub asset: String,

    /// Local id of the object inside the asset
    #[arg(long, allow_hyphen_values = true)]
    pub file_id: i64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityOutput {
    command: String,
    asset: AssetHandle,
    identity: ObjectIdentity,
    /// `GUID:FILE_ID`, as accepted by --target, --from and --to.
    target: String,
}

pub fn run(args: IdentityArgs) -> CmdResult<IdentityOutput> {
    let fs = local_files::local();
    let path = PathBuf::from(&args.asset);
    if !fs.exists(&path) {
        return Err(refswap::Error::asset_not_found(args.asset.clone(), None));
    }

    let handle = AssetHandle::load(ContentLocation::new(args.asset.as_str()), path, &fs);
    let identity = asset::resolve_identity(&handle, args.file_id)?;

    Ok((
        IdentityOutput {
            command: "identity".to_string(),
            target: identity.to_string(),
            asset: handle,
            identity,
        },
        0,
    ))
}
