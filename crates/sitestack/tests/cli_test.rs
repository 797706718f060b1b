#![allow(deprecated)] // TODO: cargo_bin → cargo_bin_cmd! migration

use assert_cmd::Command;
use predicates::prelude::*;

const SITE_VARS: [&str; 8] = [
    "SITESTACK_CONFIG",
    "SITESTACK_BUCKET_NAME",
    "SITESTACK_APP_BUCKET_NAME",
    "SITESTACK_DOMAIN_NAME",
    "SITESTACK_APP_SUBDOMAIN",
    "SITESTACK_REGION",
    "SITESTACK_PROFILE",
    "AWS_REGION",
];

/// Command with no site settings leaking in from the environment, run in an
/// empty directory
fn sitestack(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    for var in SITE_VARS {
        cmd.env_remove(var);
    }
    cmd.env("XDG_CONFIG_HOME", dir.path());
    cmd.env("HOME", dir.path());
    cmd.current_dir(dir.path());
    cmd
}

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("static website"))
        .stdout(predicate::str::contains("up"))
        .stdout(predicate::str::contains("plan"))
        .stdout(predicate::str::contains("validate"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    cmd.arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("sitestack"));
}

#[test]
fn test_up_help() {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    cmd.arg("up")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--bucket-name"))
        .stdout(predicate::str::contains("--domain-name"))
        .stdout(predicate::str::contains("--json"));
}

#[test]
fn test_validate_from_flags() {
    let dir = tempfile::tempdir().unwrap();
    sitestack(&dir)
        .args([
            "validate",
            "--bucket-name",
            "example.com",
            "--domain-name",
            "example.com",
            "--region",
            "eu-west-1",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration is valid"))
        .stdout(predicate::str::contains("app.example.com"))
        .stdout(predicate::str::contains("example.com-deployer"))
        .stdout(predicate::str::contains("dns-record"));
}

#[test]
fn test_validate_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("sitestack.yaml"),
        "bucket_name: example.org\ndomain_name: example.org\nregion: us-east-1\n",
    )
    .unwrap();

    sitestack(&dir)
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("example.org-deploy-policy"));
}

#[test]
fn test_flags_override_environment() {
    let dir = tempfile::tempdir().unwrap();
    sitestack(&dir)
        .env("SITESTACK_BUCKET_NAME", "example.com")
        .env("SITESTACK_DOMAIN_NAME", "example.com")
        .env("SITESTACK_REGION", "us-east-1")
        .args(["validate", "--region", "ap-northeast-1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ap-northeast-1"));
}

#[test]
fn test_validate_missing_domain() {
    let dir = tempfile::tempdir().unwrap();
    sitestack(&dir)
        .args(["validate", "--bucket-name", "example.com", "--region", "us-east-1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stderr(predicate::str::contains("domain_name"));
}

#[test]
fn test_up_with_invalid_config_fails_before_aws() {
    let dir = tempfile::tempdir().unwrap();
    sitestack(&dir)
        .args([
            "up",
            "--bucket-name",
            "Not_A_Bucket",
            "--domain-name",
            "example.com",
            "--region",
            "us-east-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"))
        .stdout(predicate::str::contains("Checking AWS credentials").not());
}

#[test]
fn test_missing_explicit_config_file() {
    let dir = tempfile::tempdir().unwrap();
    sitestack(&dir)
        .args(["validate", "--config", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.yaml"));
}

#[test]
fn test_invalid_command() {
    let mut cmd = Command::cargo_bin("sitestack").unwrap();
    cmd.arg("destroy").assert().failure();
}

/// aws stand-in that reports every resource of the example.com stack as present
#[cfg(unix)]
const AWS_ALL_PRESENT: &str = r#"#!/bin/sh
all="$*"
name=""
prev=""
for a in "$@"; do
  if [ "$prev" = "--start-record-name" ]; then name="$a"; fi
  prev="$a"
done
case "$all" in
  *"sts get-caller-identity"*)
    echo '{"UserId":"AIDA1","Account":"123","Arn":"arn:aws:iam::123:user/ops"}' ;;
  *"s3api head-bucket"*)
    echo '{"BucketRegion":"eu-west-1"}' ;;
  *"iam list-policies"*)
    echo '{"Policies":[{"PolicyName":"example.com-deploy-policy","Arn":"arn:aws:iam::123:policy/example.com-deploy-policy"}]}' ;;
  *"iam get-user"*)
    echo '{"User":{"UserName":"example.com-deployer","UserId":"AIDA2","Arn":"arn:aws:iam::123:user/example.com-deployer"}}' ;;
  *"acm list-certificates"*)
    echo '{"CertificateSummaryList":[{"CertificateArn":"arn:aws:acm:us-east-1:123:certificate/abc","DomainName":"example.com","Status":"ISSUED"}]}' ;;
  *"cloudfront list-distributions"*)
    echo '{"DistributionList":{"Items":[{"Id":"E1","ARN":"arn:aws:cloudfront::123:distribution/E1","DomainName":"d1.cloudfront.net","Aliases":{"Items":["example.com"]}},{"Id":"E2","ARN":"arn:aws:cloudfront::123:distribution/E2","DomainName":"d2.cloudfront.net","Aliases":{"Items":["app.example.com"]}}]}}' ;;
  *"route53 list-hosted-zones-by-name"*)
    echo '{"HostedZones":[{"Id":"/hostedzone/Z1","Name":"example.com.","Config":{"PrivateZone":false}}]}' ;;
  *"route53 list-resource-record-sets"*)
    echo "{\"ResourceRecordSets\":[{\"Name\":\"$name.\",\"Type\":\"A\"}]}" ;;
  *)
    echo "unexpected call: $all" >&2
    exit 1 ;;
esac
"#;

#[cfg(unix)]
#[test]
fn test_up_json_writes_only_the_manifest_to_stdout() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let bin = dir.path().join("bin");
    std::fs::create_dir(&bin).unwrap();
    let aws = bin.join("aws");
    std::fs::write(&aws, AWS_ALL_PRESENT).unwrap();
    std::fs::set_permissions(&aws, std::fs::Permissions::from_mode(0o755)).unwrap();

    let path = format!(
        "{}:{}",
        bin.display(),
        std::env::var("PATH").unwrap_or_default()
    );

    let output = sitestack(&dir)
        .env("PATH", path)
        .args([
            "up",
            "--json",
            "--bucket-name",
            "example.com",
            "--domain-name",
            "example.com",
            "--region",
            "eu-west-1",
        ])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let manifest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = manifest["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 9);
    assert!(entries.iter().all(|e| e["state"] == "exists"));
    assert_eq!(manifest["provider"], "aws");
    assert!(String::from_utf8_lossy(&output.stderr).contains("Checking AWS credentials"));
}
