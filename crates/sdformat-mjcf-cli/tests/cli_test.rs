//! Integration tests for the sdformat-mjcf binary.
// cargo_bin is deprecated in favor of the cargo_bin! macro; both work.
#![allow(deprecated)]

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const PENDULUM_SDF: &str = r#"<?xml version="1.0"?>
<sdf version="1.9">
  <model name="pendulum">
    <link name="base">
      <collision name="base_collision">
        <geometry><box><size>0.2 0.2 0.2</size></box></geometry>
      </collision>
    </link>
    <link name="arm">
      <pose>0 0 0.5 0 0 0</pose>
      <inertial><mass>1</mass></inertial>
      <visual name="arm_visual">
        <geometry><cylinder><radius>0.02</radius><length>1</length></cylinder></geometry>
      </visual>
    </link>
    <joint name="fix" type="fixed"><parent>world</parent><child>base</child></joint>
    <joint name="swing" type="revolute">
      <parent>base</parent><child>arm</child>
      <axis><xyz>1 0 0</xyz><limit><lower>-1.57</lower><upper>1.57</upper></limit></axis>
    </joint>
  </model>
</sdf>
"#;

const ARM_URDF: &str = r#"<?xml version="1.0"?>
<robot name="arm">
  <link name="base"/>
  <link name="tool">
    <visual><geometry><sphere radius="0.05"/></geometry></visual>
  </link>
  <joint name="wrist" type="continuous">
    <parent link="base"/><child link="tool"/>
    <origin xyz="0 0 0.3"/>
    <axis xyz="0 0 1"/>
  </joint>
</robot>
"#;

const BOX_MJCF: &str = r#"<mujoco model="drop">
  <worldbody>
    <geom name="floor" type="plane" size="2 2 0.1"/>
    <body name="box" pos="0 0 1">
      <freejoint/>
      <geom name="box_geom" type="box" size="0.1 0.1 0.1" rgba="1 0 0 1"/>
    </body>
  </worldbody>
</mujoco>
"#;

fn write_input(temp: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = temp.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("to-mjcf"))
        .stdout(predicate::str::contains("to-sdf"));
    Ok(())
}

#[test]
fn cli_sdf_to_mjcf() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = write_input(&temp, "pendulum.sdf", PENDULUM_SDF);
    let output = temp.path().join("pendulum.xml");

    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("to-mjcf").arg(&input).arg(&output);
    cmd.assert().success();

    let xml = fs::read_to_string(&output)?;
    assert!(xml.contains(r#"<mujoco model="pendulum">"#));
    assert!(xml.contains(r#"name="swing""#));
    assert!(xml.contains(r#"name="base_collision""#));
    Ok(())
}

#[test]
fn cli_urdf_to_mjcf() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = write_input(&temp, "arm.urdf", ARM_URDF);
    let output = temp.path().join("arm.xml");

    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("to-mjcf").arg(&input).arg(&output);
    cmd.assert().success();

    let xml = fs::read_to_string(&output)?;
    assert!(xml.contains(r#"name="wrist""#));
    assert!(xml.contains(r#"type="hinge""#));
    Ok(())
}

#[test]
fn cli_mjcf_to_sdf_with_plugins() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = write_input(&temp, "drop.xml", BOX_MJCF);
    let output = temp.path().join("drop.sdf");

    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("to-sdf").arg(&input).arg(&output).arg("--export-world-plugins");
    cmd.assert().success();

    let sdf = fs::read_to_string(&output)?;
    assert!(sdf.contains(r#"<world name="default">"#));
    assert!(sdf.contains(r#"name="collision_box_geom""#));
    assert!(sdf.contains("ignition::gazebo::systems::Physics"));
    Ok(())
}

#[test]
fn cli_config_file_applies() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = write_input(&temp, "drop.xml", BOX_MJCF);
    let config = write_input(&temp, "convert.ron", "(export_world_plugins: true)");
    let output = temp.path().join("drop.sdf");

    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("--config").arg(&config).arg("to-sdf").arg(&input).arg(&output);
    cmd.assert().success();

    let sdf = fs::read_to_string(&output)?;
    assert!(sdf.contains("ignition::gazebo::systems::SceneBroadcaster"));
    Ok(())
}

#[test]
fn cli_missing_input_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("to-sdf")
        .arg(temp.path().join("missing.xml"))
        .arg(temp.path().join("out.sdf"));
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));
    Ok(())
}

#[test]
fn cli_unsupported_input_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let input = write_input(
        &temp,
        "terrain.xml",
        r#"<mujoco><worldbody><geom type="hfield" size="1 1 1 1"/></worldbody></mujoco>"#,
    );
    let mut cmd = Command::new(cargo_bin("sdformat-mjcf"));
    cmd.arg("to-sdf").arg(&input).arg(temp.path().join("out.sdf"));
    cmd.assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported"));
    Ok(())
}
