/// Parse a `SERVICE=COMMAND` pair given on the command line
pub fn parse_script_choice(arg: &str) -> Result<(String, String), String> {
    let (service, command) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected SERVICE=COMMAND, got '{arg}'"))?;

    let (service, command) = (service.trim(), command.trim());
    if service.is_empty() || command.is_empty() {
        return Err(format!("expected SERVICE=COMMAND, got '{arg}'"));
    }

    Ok((service.to_string(), command.to_string()))
}
