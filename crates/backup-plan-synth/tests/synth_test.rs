use backup_plan_core::{Duration, ResourceSelector, SchedulingRequest, TagOperation};
use backup_plan_core::{BackupProvisioner, OutputValue, ProvisioningResult, ResourceSelection};
use backup_plan_synth::{SynthOptions, Template, TemplateSynthesizer};
use serde_json::{json, Value};
use std::collections::BTreeMap;

fn request() -> SchedulingRequest {
    SchedulingRequest::new(
        "intgtestBkPlan",
        vec![ResourceSelector::from_tag("solution", "awsbackuparch")],
    )
    .with_start_time(3, 0)
}

async fn synth_value(options: SynthOptions, request: &SchedulingRequest) -> Value {
    TemplateSynthesizer::synthesize(options, request)
        .await
        .unwrap()
        .to_value()
        .unwrap()
}

#[tokio::test]
async fn test_default_plan_template() {
    let value = synth_value(SynthOptions::default(), &request()).await;

    let resources = value["Resources"].as_object().unwrap();
    let mut ids: Vec<_> = resources.keys().cloned().collect();
    ids.sort();
    assert_eq!(
        ids,
        vec!["BackupPlan", "BackupRole", "BackupSelection", "BackupVault"]
    );

    let plan = &value["Resources"]["BackupPlan"];
    assert_eq!(plan["Type"], json!("AWS::Backup::BackupPlan"));
    assert_eq!(
        plan["Properties"]["BackupPlan"]["BackupPlanName"],
        json!("intgtestBkPlan")
    );

    let rules = plan["Properties"]["BackupPlan"]["BackupPlanRule"]
        .as_array()
        .unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(
        rules[0],
        json!({
            "RuleName": "ScheduledBackupRule",
            "TargetBackupVault": { "Ref": "BackupVault" },
            "ScheduleExpression": "cron(0 3 * * ? *)",
            "StartWindowMinutes": 120,
            "CompletionWindowMinutes": 180,
            "Lifecycle": { "DeleteAfterDays": 90 },
        })
    );
    assert!(plan["Properties"].get("BackupPlanTags").is_none());

    let vault = &value["Resources"]["BackupVault"];
    assert_eq!(
        vault["Properties"]["BackupVaultName"],
        json!("intgtestBkPlan-vault")
    );
    assert_eq!(vault["DeletionPolicy"], json!("Retain"));
    assert_eq!(
        value["Resources"]["BackupRole"]["Properties"]["ManagedPolicyArns"]
            .as_array()
            .unwrap()
            .len(),
        1
    );

    let selection = &value["Resources"]["BackupSelection"]["Properties"];
    assert_eq!(selection["BackupPlanId"], json!({ "Ref": "BackupPlan" }));
    assert_eq!(
        selection["BackupSelection"]["IamRoleArn"],
        json!({ "Fn::GetAtt": ["BackupRole", "Arn"] })
    );
    assert_eq!(
        selection["BackupSelection"]["ListOfTags"],
        json!([{
            "ConditionType": "STRINGEQUALS",
            "ConditionKey": "solution",
            "ConditionValue": "awsbackuparch",
        }])
    );

    assert_eq!(
        value["Outputs"],
        json!({
            "BackupPlanId": {
                "Description": "ID of the backup plan",
                "Value": { "Ref": "BackupPlan" },
            },
            "BackupPlanArn": {
                "Description": "ARN of the backup plan",
                "Value": { "Fn::GetAtt": ["BackupPlan", "BackupPlanArn"] },
            },
        })
    );
}

#[tokio::test]
async fn test_options_and_lifecycle() {
    let mut tags = BTreeMap::new();
    tags.insert("solution".to_string(), "backupByTag".to_string());
    tags.insert("environment".to_string(), "dev".to_string());

    let options = SynthOptions {
        description: Some("Nightly backups".to_string()),
        vault_name: Some("shared-vault".to_string()),
        tags,
        allow_restores: true,
    };
    let req = request()
        .with_retention(Duration::days(365))
        .with_cold_storage_after(Duration::days(30))
        .with_completion_window(Duration::hours(8));
    let value = synth_value(options, &req).await;

    assert_eq!(value["Description"], json!("Nightly backups"));
    assert_eq!(
        value["Resources"]["BackupVault"]["Properties"],
        json!({
            "BackupVaultName": "shared-vault",
            "BackupVaultTags": { "environment": "dev", "solution": "backupByTag" },
        })
    );

    let plan = &value["Resources"]["BackupPlan"]["Properties"];
    assert_eq!(
        plan["BackupPlanTags"],
        json!({ "environment": "dev", "solution": "backupByTag" })
    );
    let rule = &plan["BackupPlan"]["BackupPlanRule"][0];
    assert_eq!(
        rule["Lifecycle"],
        json!({ "DeleteAfterDays": 365, "MoveToColdStorageAfterDays": 30 })
    );
    assert_eq!(rule["CompletionWindowMinutes"], json!(480));
    assert_eq!(rule["StartWindowMinutes"], json!(420));

    let policies = value["Resources"]["BackupRole"]["Properties"]["ManagedPolicyArns"]
        .as_array()
        .unwrap();
    assert_eq!(policies.len(), 2);
}

#[tokio::test]
async fn test_invalid_request_produces_no_template() {
    let err = TemplateSynthesizer::synthesize(SynthOptions::default(), &request().with_start_time(-1, 0))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("start hour out of range"));
}

#[tokio::test]
async fn test_selection_requires_plan() {
    let synth = TemplateSynthesizer::new(SynthOptions::default());
    let plan = ProvisioningResult {
        plan_id: OutputValue::reference("BackupPlan"),
        plan_arn: OutputValue::get_att("BackupPlan", "BackupPlanArn"),
    };
    let selection = ResourceSelection::new(vec![ResourceSelector::from_arn("*")]);

    assert!(synth.create_selection(&plan, &selection).await.is_err());
    assert!(synth.template().resources.is_empty());
}

#[tokio::test]
async fn test_second_plan_is_rejected() {
    let synth = TemplateSynthesizer::new(SynthOptions::default());
    let descriptor = backup_plan_core::build(&request()).unwrap();
    synth.create_plan(&descriptor).await.unwrap();
    assert!(synth.create_plan(&descriptor).await.is_err());
}

#[tokio::test]
async fn test_rendering_is_stable() {
    let req = request().with_cold_storage_after(Duration::days(10));
    let req = SchedulingRequest {
        resources: vec![
            ResourceSelector::from_tag_with("env", "prod*", TagOperation::StringLike),
            ResourceSelector::from_arn("arn:aws:ec2:*:*:volume/*"),
        ],
        ..req
    };
    let first = TemplateSynthesizer::synthesize(SynthOptions::default(), &req)
        .await
        .unwrap();
    let second = TemplateSynthesizer::synthesize(SynthOptions::default(), &req)
        .await
        .unwrap();
    assert_eq!(first.render_pretty().unwrap(), second.render_pretty().unwrap());

    let parsed: Template = serde_json::from_str(&first.render_pretty().unwrap()).unwrap();
    assert_eq!(parsed, first);
}

#[tokio::test]
async fn test_mixed_selectors_each_add_resources() {
    let req = SchedulingRequest {
        resources: vec![
            ResourceSelector::from_tag_with("env", "prod*", TagOperation::StringLike),
            ResourceSelector::from_tag_with("team", "db*", TagOperation::StringLike),
            ResourceSelector::from_arn("arn:aws:dynamodb:*:*:table/orders"),
        ],
        ..request()
    };
    let value = synth_value(SynthOptions::default(), &req).await;
    let resources = &value["Resources"];

    let by_arn = &resources["BackupSelection"]["Properties"]["BackupSelection"];
    assert_eq!(by_arn["Resources"], json!(["arn:aws:dynamodb:*:*:table/orders"]));
    assert!(by_arn.get("Conditions").is_none());

    for (id, key) in [("BackupSelection2", "env"), ("BackupSelection3", "team")] {
        let props = &resources[id]["Properties"];
        assert_eq!(props["BackupPlanId"], json!({ "Ref": "BackupPlan" }));
        assert_eq!(props["BackupSelection"]["Resources"], json!(["*"]));
        let conditions = props["BackupSelection"]["Conditions"]["StringLike"]
            .as_array()
            .unwrap();
        assert_eq!(conditions.len(), 1);
        assert_eq!(
            conditions[0]["ConditionKey"],
            json!(format!("aws:ResourceTag/{}", key))
        );
    }
    assert_eq!(resources.as_object().unwrap().len(), 6);
}

#[tokio::test]
async fn test_long_dotted_plan_name_yields_valid_vault_name() {
    let name = format!("nightly.v2-{}", "a".repeat(39));
    assert_eq!(name.len(), 50);
    let req = SchedulingRequest {
        name: name.clone(),
        ..request()
    };
    let value = synth_value(SynthOptions::default(), &req).await;

    let vault_name = value["Resources"]["BackupVault"]["Properties"]["BackupVaultName"]
        .as_str()
        .unwrap();
    assert!((2..=50).contains(&vault_name.len()), "{vault_name}");
    assert!(vault_name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    assert_eq!(
        value["Resources"]["BackupPlan"]["Properties"]["BackupPlan"]["BackupPlanName"],
        json!(name)
    );
}
