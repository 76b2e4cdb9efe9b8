//! Line-oriented [`Shell`] driving a [`Client`].

use std::{fmt, str::FromStr};

use client::{auth, Mode, Toggle};
use service::{
    domain::{map, property, user, GeoPoint, Region},
    read::property::WithMaps,
};
use tokio::io::{
    AsyncBufRead, AsyncBufReadExt as _, AsyncWrite, AsyncWriteExt as _,
    Lines,
};
use tracing as log;

use crate::{AsError as _, Client, Error};

crate::define_error! {
    enum ShellError {
        #[code = "UNKNOWN_COMMAND"]
        #[message = "Unknown command, type `help` to list the known ones"]
        UnknownCommand,

        #[code = "INVALID_ARGUMENT"]
        #[message = "Missing or malformed argument"]
        InvalidArgument,

        #[code = "INVALID_ARGUMENT"]
        #[message = "Coordinates are out of range"]
        InvalidCoordinates,

        #[code = "INVALID_ARGUMENT"]
        #[message = "Malformed user ID"]
        InvalidUserId,

        #[code = "NOT_FOUND"]
        #[message = "No entry with such number"]
        NoSuchEntry,
    }
}

/// Usage of the [`Shell`].
const HELP: &str = "\
sign-in <uid>                    sign in as the user with the given ID
sign-out                         sign out
properties                       list your properties
add-property <lat> <lng> <name>  register a property pinned at the location
select <#n|id>                   select a property
delete-property <#n|id>          delete a property along with its maps
draw                             start drawing, or cancel the drawing
point <lat> <lng>                place a point of the drawing
undo                             remove the last placed point
finalize                         stop placing points
describe <text>                  describe the finalized drawing
kind <text>                      tag the finalized drawing
save                             save the finalized drawing as a map
back                             return to placing points
maps                             list maps of the selected property
show-map <#n|id>                 frame a map of the selected property
delete-map <#n|id>               delete a map of the selected property
overview                         list your properties with their maps
region                           show the current viewport
status                           show what is going on
help                             show this message
quit                             leave";

/// Single instruction of the [`Shell`].
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// Sign in as the user with the provided ID.
    SignIn(user::Id),

    /// Sign out.
    SignOut,

    /// List the properties.
    Properties,

    /// Register a new property.
    AddProperty {
        /// Pin location of the property.
        location: GeoPoint,

        /// Name of the property.
        name: String,
    },

    /// Select a property.
    Select(Target),

    /// Delete a property.
    DeleteProperty(Target),

    /// Start or cancel drawing.
    Draw,

    /// Place a point.
    Point(GeoPoint),

    /// Remove the last placed point.
    Undo,

    /// Stop placing points.
    Finalize,

    /// Describe the drawing.
    Describe(String),

    /// Tag the drawing.
    Kind(String),

    /// Save the drawing.
    Save,

    /// Return to placing points.
    Back,

    /// List the maps of the selected property.
    Maps,

    /// Frame a map.
    ShowMap(Target),

    /// Delete a map.
    DeleteMap(Target),

    /// List the properties along with their maps.
    Overview,

    /// Show the current viewport.
    Region,

    /// Show the current state.
    Status,

    /// Show the usage.
    Help,

    /// Leave the [`Shell`].
    Quit,
}

impl FromStr for Instruction {
    type Err = ShellError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (command, args) = split_word(line.trim());
        Ok(match command {
            "sign-in" => {
                Self::SignIn(user::Id::new(args).ok_or(ShellError::InvalidUserId)?)
            }
            "sign-out" => Self::SignOut,
            "properties" => Self::Properties,
            "add-property" => {
                let (location, name) = coordinates(args)?;
                Self::AddProperty {
                    location,
                    name: name.to_owned(),
                }
            }
            "select" => Self::Select(args.parse()?),
            "delete-property" => Self::DeleteProperty(args.parse()?),
            "draw" => Self::Draw,
            "point" => match coordinates(args)? {
                (point, "") => Self::Point(point),
                (_, _) => return Err(ShellError::InvalidArgument),
            },
            "undo" => Self::Undo,
            "finalize" => Self::Finalize,
            "describe" => Self::Describe(args.to_owned()),
            "kind" => Self::Kind(args.to_owned()),
            "save" => Self::Save,
            "back" => Self::Back,
            "maps" => Self::Maps,
            "show-map" => Self::ShowMap(args.parse()?),
            "delete-map" => Self::DeleteMap(args.parse()?),
            "overview" => Self::Overview,
            "region" => Self::Region,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(ShellError::UnknownCommand),
        })
    }
}

/// Reference to a listed entry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Target {
    /// 1-based position in the last listing.
    Nth(usize),

    /// Raw ID of the entry.
    Id(String),
}

impl FromStr for Target {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Err(ShellError::InvalidArgument),
            s => match s.strip_prefix('#') {
                Some(n) => n
                    .parse()
                    .ok()
                    .filter(|n| *n > 0)
                    .map(Self::Nth)
                    .ok_or(ShellError::InvalidArgument),
                None => Ok(Self::Id(s.to_owned())),
            },
        }
    }
}

/// Outcome of an executed [`Instruction`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Flow {
    /// Read the next [`Instruction`].
    Continue,

    /// Leave the [`Shell`].
    Quit,
}

/// Interactive shell reading [`Instruction`]s line by line.
#[derive(Debug)]
pub struct Shell<R, W> {
    /// [`Client`] the [`Instruction`]s are executed upon.
    client: Client,

    /// Viewport shown while nothing is selected.
    initial: Region,

    /// Currently shown viewport.
    viewport: Region,

    /// Lines of the input.
    input: Lines<R>,

    /// Output to answer into.
    output: W,
}

impl<R, W> Shell<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a new [`Shell`] over the provided [`Client`] showing the
    /// `initial` viewport.
    #[must_use]
    pub fn new(client: Client, initial: Region, input: R, output: W) -> Self {
        Self {
            client,
            initial,
            viewport: initial,
            input: input.lines(),
            output,
        }
    }

    /// Runs this [`Shell`] until the input ends or [`Instruction::Quit`].
    ///
    /// # Errors
    ///
    /// If failed to read the input or write the output.
    pub async fn run(&mut self) -> std::io::Result<()> {
        self.write("type `help` to list the commands\n").await?;
        loop {
            self.write("> ").await?;
            let Some(line) = self.input.next_line().await? else {
                break;
            };
            if line.trim().is_empty() {
                continue;
            }

            let res = match line.parse::<Instruction>() {
                Ok(instruction) => self.execute(instruction).await,
                Err(e) => Err(e.into()),
            };
            match res {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    log::debug!("`{line}` failed: {e}");
                    self.write(&format!("{e}\n")).await?;
                }
            }
        }
        Ok(())
    }

    /// Executes the provided [`Instruction`].
    async fn execute(&mut self, instruction: Instruction) -> Result<Flow, Error> {
        use Instruction as I;

        match instruction {
            I::SignIn(owner_id) => {
                self.client
                    .handle(auth::Event::SignedIn(owner_id))
                    .await
                    .map_err(|e| e.into_error())?;
                self.viewport = self.initial;
                self.say(format!(
                    "signed in, {} properties",
                    self.client.catalog().properties().len(),
                ))
                .await?;
            }
            I::SignOut => {
                self.client
                    .handle(auth::Event::SignedOut)
                    .await
                    .map_err(|e| e.into_error())?;
                self.viewport = self.initial;
                self.say("signed out").await?;
            }
            I::Properties => {
                self.client.reload().await.map_err(|e| e.into_error())?;
                if self.client.catalog().selected().is_none() {
                    self.viewport = self.initial;
                }
                self.list_properties().await?;
            }
            I::AddProperty { location, name } => {
                let property = self
                    .client
                    .create_property(&name, location)
                    .await
                    .map_err(|e| e.into_error())?;
                self.say(format!(
                    "created #{} {} [{}]",
                    self.client.catalog().properties().len(),
                    property.name,
                    property.id,
                ))
                .await?;
            }
            I::Select(target) => {
                let id = self.property_id(&target)?;
                self.viewport =
                    self.client.select(id).map_err(|e| e.into_error())?;
                self.say(format!("selected, {}", self.viewport)).await?;
            }
            I::DeleteProperty(target) => {
                let id = self.property_id(&target)?;
                if !self
                    .confirm(
                        "Tem certeza que deseja excluir esta propriedade e \
                         seus mapas?",
                    )
                    .await
                {
                    return self.say("kept").await.map(|()| Flow::Continue);
                }
                self.client
                    .delete_property(id)
                    .await
                    .map_err(|e| e.into_error())?;
                if self.client.catalog().selected().is_none() {
                    self.viewport = self.initial;
                }
                self.say("deleted").await?;
            }
            I::Draw => {
                let (input, output) = (&mut self.input, &mut self.output);
                let toggled = self
                    .client
                    .toggle_drawing(move || async move {
                        confirm(
                            input,
                            output,
                            "Você deseja realmente cancelar o desenho atual?",
                        )
                        .await
                    })
                    .await
                    .map_err(|e| e.into_error())?;
                self.say(match toggled {
                    Toggle::Started => "drawing, place points with `point`",
                    Toggle::Cancelled => "drawing cancelled",
                    Toggle::Kept => "drawing kept",
                })
                .await?;
            }
            I::Point(point) => {
                if self.client.drawing().mode() != Mode::Drawing {
                    return self
                        .say("not drawing, point ignored")
                        .await
                        .map(|()| Flow::Continue);
                }
                self.client.drawing_mut().add_point(point);
                if let Some(region) = self.client.drawing().region() {
                    self.viewport = region;
                }
                self.say(format!(
                    "{} points",
                    self.client.drawing().points().len(),
                ))
                .await?;
            }
            I::Undo => match self.client.drawing_mut().undo_last() {
                Some(point) => {
                    if let Some(region) = self.client.drawing().region() {
                        self.viewport = region;
                    }
                    self.say(format!(
                        "removed {point}, {} points left",
                        self.client.drawing().points().len(),
                    ))
                    .await?;
                }
                None => self.say("nothing to undo").await?,
            },
            I::Finalize => {
                self.client
                    .drawing_mut()
                    .finalize()
                    .map_err(|e| e.into_error())?;
                self.say("describe with `describe`, then `save`").await?;
            }
            I::Describe(text) => {
                self.client
                    .drawing_mut()
                    .set_description(text)
                    .map_err(|e| e.into_error())?;
                self.say("described").await?;
            }
            I::Kind(text) => {
                self.client
                    .drawing_mut()
                    .set_kind(text)
                    .map_err(|e| e.into_error())?;
                self.say("tagged").await?;
            }
            I::Save => {
                let map = self
                    .client
                    .save_drawing()
                    .await
                    .map_err(|e| e.into_error())?;
                self.viewport = map.region();
                self.say(format!("saved map [{}]", map.id)).await?;
            }
            I::Back => {
                self.client
                    .drawing_mut()
                    .cancel_finalizing()
                    .map_err(|e| e.into_error())?;
                self.say("drawing, place points with `point`").await?;
            }
            I::Maps => {
                _ = self
                    .client
                    .load_maps()
                    .await
                    .map_err(|e| e.into_error())?;
                self.list_maps().await?;
            }
            I::ShowMap(target) => {
                let id = self.map_id(&target)?;
                self.viewport = self
                    .client
                    .catalog()
                    .frame_map(id)
                    .map_err(|e| e.into_error())?;
                self.say(format!("{}", self.viewport)).await?;
            }
            I::DeleteMap(target) => {
                let id = self.map_id(&target)?;
                if !self
                    .confirm("Tem certeza que deseja excluir este mapa?")
                    .await
                {
                    return self.say("kept").await.map(|()| Flow::Continue);
                }
                self.client
                    .delete_map(id)
                    .await
                    .map_err(|e| e.into_error())?;
                self.say("deleted").await?;
            }
            I::Overview => {
                let overview = self
                    .client
                    .overview()
                    .await
                    .map_err(|e| e.into_error())?;
                self.list_overview(&overview).await?;
            }
            I::Region => self.say(format!("{}", self.viewport)).await?,
            I::Status => self.say(Status(&self.client).to_string()).await?,
            I::Help => self.say(HELP).await?,
            I::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Lists the held properties.
    async fn list_properties(&mut self) -> Result<(), Error> {
        let catalog = self.client.catalog();
        let mut listing = String::new();
        for (n, p) in (1..).zip(catalog.properties()) {
            let mark = if catalog.selected_id() == Some(p.id) {
                '*'
            } else {
                ' '
            };
            listing.push_str(&format!(
                "{mark}#{n} {} at {}, created {} [{}]\n",
                p.name, p.location, p.created_at, p.id,
            ));
        }
        if listing.is_empty() {
            listing.push_str("no properties\n");
        }
        self.write(&listing).await.map_err(|e| Error::internal(&e))
    }

    /// Lists the loaded maps of the selected property.
    async fn list_maps(&mut self) -> Result<(), Error> {
        let mut listing = String::new();
        for (n, m) in (1..).zip(self.client.catalog().maps()) {
            listing.push_str(&format!(
                "#{n} {}{} with {} points, created {} [{}]\n",
                m.description,
                m.kind.as_ref().map(|k| format!(" ({k})")).unwrap_or_default(),
                m.polygon.len(),
                m.created_at,
                m.id,
            ));
        }
        if listing.is_empty() {
            listing.push_str("no maps\n");
        }
        self.write(&listing).await.map_err(|e| Error::internal(&e))
    }

    /// Lists the provided [`Property`]s along with their maps.
    ///
    /// [`Property`]: service::domain::Property
    async fn list_overview(
        &mut self,
        overview: &[WithMaps],
    ) -> Result<(), Error> {
        let mut listing = String::new();
        for WithMaps { property, maps } in overview {
            listing.push_str(&format!(
                "{} at {}, {} maps\n",
                property.name,
                property.location,
                maps.len(),
            ));
            for m in maps {
                listing.push_str(&format!(
                    "  - {}{} with {} points\n",
                    m.description,
                    m.kind.as_ref().map(|k| format!(" ({k})")).unwrap_or_default(),
                    m.polygon.len(),
                ));
            }
        }
        if listing.is_empty() {
            listing.push_str("no properties\n");
        }
        self.write(&listing).await.map_err(|e| Error::internal(&e))
    }

    /// Resolves the provided [`Target`] into a listed property ID.
    fn property_id(&self, target: &Target) -> Result<property::Id, Error> {
        match target {
            Target::Nth(n) => n
                .checked_sub(1)
                .and_then(|i| self.client.catalog().properties().get(i))
                .map(|p| p.id)
                .ok_or_else(|| ShellError::NoSuchEntry.into()),
            Target::Id(id) => {
                id.parse().map_err(|_| ShellError::InvalidArgument.into())
            }
        }
    }

    /// Resolves the provided [`Target`] into a listed map ID.
    fn map_id(&self, target: &Target) -> Result<map::Id, Error> {
        match target {
            Target::Nth(n) => n
                .checked_sub(1)
                .and_then(|i| self.client.catalog().maps().get(i))
                .map(|m| m.id)
                .ok_or_else(|| ShellError::NoSuchEntry.into()),
            Target::Id(id) => {
                id.parse().map_err(|_| ShellError::InvalidArgument.into())
            }
        }
    }

    /// Asks the provided `question` awaiting the answer.
    async fn confirm(&mut self, question: &str) -> bool {
        confirm(&mut self.input, &mut self.output, question).await
    }

    /// Writes the provided `message` as a separate line.
    async fn say(&mut self, message: impl fmt::Display) -> Result<(), Error> {
        self.write(&format!("{message}\n"))
            .await
            .map_err(|e| Error::internal(&e))
    }

    /// Writes the provided `text` as is.
    async fn write(&mut self, text: &str) -> std::io::Result<()> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await
    }
}

/// Asks the provided `question`, reading a `Sim` (yes) or `Não` (no) answer.
///
/// Anything but `Sim` is considered a no.
async fn confirm<R, W>(input: &mut Lines<R>, output: &mut W, question: &str) -> bool
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let asked = output
        .write_all(format!("{question} (Sim/Não) ").as_bytes())
        .await
        .is_ok()
        && output.flush().await.is_ok();
    if !asked {
        return false;
    }

    match input.next_line().await {
        Ok(Some(answer)) => {
            let answer = answer.trim().to_lowercase();
            answer == "sim" || answer == "s"
        }
        Ok(None) | Err(_) => false,
    }
}

/// Displayable state of a [`Client`].
struct Status<'c>(&'c Client);

impl fmt::Display for Status<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(client) = self;

        match client.owner_id() {
            Some(id) => write!(f, "signed in as {id}")?,
            None => write!(f, "signed out")?,
        }
        match client.catalog().selected() {
            Some(p) => write!(f, "; property: {}", p.name)?,
            None => write!(f, "; no property selected")?,
        }
        let drawing = client.drawing();
        write!(f, "; {}", drawing.mode())?;
        if drawing.mode() != Mode::Idle {
            write!(f, " with {} points", drawing.points().len())?;
        }
        Ok(())
    }
}

/// Splits the provided `s`tring into its first word and the rest.
fn split_word(s: &str) -> (&str, &str) {
    match s.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim_start()),
        None => (s, ""),
    }
}

/// Parses leading coordinates of the provided `args`, returning them along
/// with the rest.
fn coordinates(args: &str) -> Result<(GeoPoint, &str), ShellError> {
    let (latitude, rest) = split_word(args);
    let (longitude, rest) = split_word(rest);
    let latitude = latitude
        .parse()
        .map_err(|_| ShellError::InvalidArgument)?;
    let longitude = longitude
        .parse()
        .map_err(|_| ShellError::InvalidArgument)?;
    GeoPoint::new(latitude, longitude)
        .map(|point| (point, rest))
        .ok_or(ShellError::InvalidCoordinates)
}

#[cfg(test)]
mod spec {
    use service::{
        domain::{user, GeoPoint, Region},
        infra::Memory,
    };

    use crate::{Client, Service};

    use super::{Instruction, Shell, ShellError, Target};

    async fn run(script: &str) -> String {
        let client = Client::new(Service::new(Memory::new()));
        let initial =
            Region::new(GeoPoint::new(-24.56, -54.06).unwrap(), 50.0, 50.0)
                .unwrap();
        let mut output = Vec::new();

        Shell::new(client, initial, script.as_bytes(), &mut output)
            .run()
            .await
            .unwrap();

        String::from_utf8(output).unwrap()
    }

    #[test]
    fn parses_instructions() {
        assert_eq!(
            "sign-in owner".parse::<Instruction>(),
            Ok(Instruction::SignIn(user::Id::new("owner").unwrap())),
        );
        assert_eq!(
            "add-property -24.5 -54.0  Sítio Boa Vista".parse::<Instruction>(),
            Ok(Instruction::AddProperty {
                location: GeoPoint::new(-24.5, -54.0).unwrap(),
                name: "Sítio Boa Vista".to_owned(),
            }),
        );
        assert_eq!(
            "select #2".parse::<Instruction>(),
            Ok(Instruction::Select(Target::Nth(2))),
        );
        assert_eq!(
            "  describe  north field ".parse::<Instruction>(),
            Ok(Instruction::Describe("north field".to_owned())),
        );
    }

    #[test]
    fn rejects_malformed_instructions() {
        assert_eq!(
            "jump".parse::<Instruction>(),
            Err(ShellError::UnknownCommand),
        );
        assert_eq!(
            "point 91 0".parse::<Instruction>(),
            Err(ShellError::InvalidCoordinates),
        );
        assert_eq!(
            "point 1".parse::<Instruction>(),
            Err(ShellError::InvalidArgument),
        );
        assert_eq!(
            "select #0".parse::<Instruction>(),
            Err(ShellError::InvalidArgument),
        );
        assert_eq!(
            "sign-in".parse::<Instruction>(),
            Err(ShellError::InvalidUserId),
        );
    }

    #[tokio::test]
    async fn draws_and_saves_map() {
        let output = run("\
            sign-in owner\n\
            add-property -24.56 -54.06 Sítio Boa Vista\n\
            select #1\n\
            draw\n\
            point -24.5 -54.0\n\
            point -24.6 -54.0\n\
            finalize\n\
            point -24.6 -54.1\n\
            finalize\n\
            describe north field\n\
            kind pasture\n\
            save\n\
            maps\n\
            quit\n\
            status\n")
        .await;

        assert!(output.contains("[VALIDATION]: minimum 3 points"));
        assert!(output.contains("saved map"));
        assert!(output.contains("#1 north field (pasture) with 3 points"));
        assert!(!output.contains("signed in as owner"));
    }

    #[tokio::test]
    async fn asks_before_discarding_points() {
        let output = run("\
            sign-in owner\n\
            add-property 10 20 Fazenda\n\
            select #1\n\
            draw\n\
            point 10 20\n\
            draw\n\
            Não\n\
            status\n\
            draw\n\
            Sim\n\
            status\n")
        .await;

        assert!(output.contains("(Sim/Não)"));
        assert!(output.contains("drawing kept"));
        assert!(output.contains("drawing with 1 points"));
        assert!(output.contains("drawing cancelled"));
        assert!(output.contains("property: Fazenda; idle"));
    }

    #[tokio::test]
    async fn reports_coded_errors() {
        let output = run("\
            draw\n\
            add-property 0 0 Fazenda\n\
            sign-in owner\n\
            select #3\n\
            finalize\n")
        .await;

        assert!(output.contains("[PRECONDITION]: no property selected"));
        assert!(output.contains("[PRECONDITION]: signed out"));
        assert!(output.contains("[NOT_FOUND]: No entry with such number"));
        assert!(output.contains("[PRECONDITION]: not drawing"));
    }

    #[tokio::test]
    async fn overviews_properties_with_maps() {
        let output = run("\
            overview\n\
            sign-in owner\n\
            add-property 10 20 Fazenda\n\
            add-property 11 21 Sítio\n\
            select #2\n\
            draw\n\
            point 11 21\n\
            point 11 22\n\
            point 12 22\n\
            finalize\n\
            describe orchard\n\
            save\n\
            overview\n")
        .await;

        assert!(output.contains("[PRECONDITION]: signed out"));
        assert!(output.contains("Fazenda at (10, 20), 0 maps"));
        assert!(output.contains(
            "Sítio at (11, 21), 1 maps\n  - orchard with 3 points",
        ));
    }
}
