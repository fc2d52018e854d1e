use std::env::current_dir;
use std::fs::create_dir_all;

use cosmwasm_schema::{export_schema, remove_schemas, schema_for};

use realty_escrow::msg::{
    DepositResponse, ExecuteMsg, InstantiateMsg, ListingResponse, ListingsResponse, QueryMsg,
    UpdateContractMsg,
};
use realty_escrow::state::ContractInfo;

fn main() {
    let mut out_dir = current_dir().unwrap();
    out_dir.push("artifacts/schema");
    create_dir_all(&out_dir).unwrap();
    remove_schemas(&out_dir).unwrap();

    export_schema(&schema_for!(InstantiateMsg), &out_dir);
    export_schema(&schema_for!(ExecuteMsg), &out_dir);
    export_schema(&schema_for!(QueryMsg), &out_dir);
    export_schema(&schema_for!(UpdateContractMsg), &out_dir);
    export_schema(&schema_for!(ContractInfo), &out_dir);
    export_schema(&schema_for!(ListingResponse), &out_dir);
    export_schema(&schema_for!(DepositResponse), &out_dir);
    export_schema(&schema_for!(ListingsResponse), &out_dir);
}
