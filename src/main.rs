use iced::{Element, Subscription, Task, Theme};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod ui;

use nanoedit::codec::InlineImage;
use nanoedit::config::Config;
use nanoedit::error::{DownloadError, RequestError, SessionError};
use nanoedit::files;
use nanoedit::gemini::{GeminiClient, ImageEditor};
use nanoedit::state::{ImageAsset, RequestTicket};

/// Main application state
struct NanoEdit {
    config: Config,
    /// The image model, injected so the update loop never touches a global client
    editor: Arc<dyn ImageEditor>,
    has_api_key: bool,
    /// Open editing session, if any
    workspace: Option<ui::Workspace>,
    /// Status message shown on the start screen
    status: String,
    loading: bool,
}

/// Application messages (events)
#[derive(Debug, Clone)]
pub enum Message {
    /// User clicked "Choose Image"
    PickImage,
    /// File dialog closed, or a file was dropped on the start screen
    ImagePicked(Option<PathBuf>),
    /// Background read finished
    ImageLoaded(Result<ImageAsset, String>),
    InstructionChanged(String),
    Submit,
    /// The image model answered the request identified by the ticket
    EditFinished(RequestTicket, Result<InlineImage, RequestError>),
    RestoreOriginal,
    RestoreEntry(u64),
    CompareStart,
    CompareEnd,
    Download,
    Downloaded(Result<PathBuf, String>),
    CloseEditor,
}

impl NanoEdit {
    fn new(config: Config, client: GeminiClient) -> (Self, Task<Message>) {
        let has_api_key = client.has_api_key();
        if !has_api_key {
            tracing::warn!("no API key configured; edits will fail until GEMINI_API_KEY is set");
        }
        tracing::info!(model = %client.model(), "NanoEdit initialized");

        (
            NanoEdit {
                config,
                editor: Arc::new(client),
                has_api_key,
                workspace: None,
                status: String::from("Ready."),
                loading: false,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => Task::perform(files::upload::pick_image(), Message::ImagePicked),
            Message::ImagePicked(Some(path)) if self.workspace.is_none() && !self.loading => {
                self.loading = true;
                self.status = format!("Opening {}...", path.display());
                Task::perform(
                    async move {
                        files::upload::load_image(path)
                            .await
                            .map_err(|e| e.to_string())
                    },
                    Message::ImageLoaded,
                )
            }
            Message::ImagePicked(_) => Task::none(),
            Message::ImageLoaded(result) => {
                self.loading = false;
                match result {
                    Ok(asset) => {
                        self.status = String::from("Ready.");
                        self.workspace = Some(ui::Workspace::new(asset));
                    }
                    Err(message) => {
                        tracing::warn!(error = %message, "upload rejected");
                        self.status = message;
                    }
                }
                Task::none()
            }
            Message::CloseEditor => {
                if let Some(workspace) = self.workspace.take() {
                    workspace.session.close();
                }
                Task::none()
            }
            Message::EditFinished(ticket, outcome) => {
                match self.workspace.as_mut() {
                    Some(workspace) => {
                        workspace.finish_edit(ticket, outcome);
                    }
                    None => tracing::warn!("edit response arrived after the editor was closed"),
                }
                Task::none()
            }
            message => match self.workspace.as_mut() {
                Some(workspace) => Self::update_workspace(
                    workspace,
                    Arc::clone(&self.editor),
                    &self.config,
                    message,
                ),
                None => Task::none(),
            },
        }
    }

    fn update_workspace(
        workspace: &mut ui::Workspace,
        editor: Arc<dyn ImageEditor>,
        config: &Config,
        message: Message,
    ) -> Task<Message> {
        match message {
            Message::InstructionChanged(instruction) => {
                workspace.session.set_instruction(instruction);
            }
            Message::Submit => match workspace.session.begin_submit() {
                Ok(request) => {
                    workspace.notice = None;
                    let ticket = request.ticket;
                    return Task::perform(
                        async move {
                            editor
                                .request_edit(&request.source, &request.instruction)
                                .await
                        },
                        move |outcome| Message::EditFinished(ticket, outcome),
                    );
                }
                Err(SessionError::Busy) | Err(SessionError::Validation(_)) => {}
                Err(e) => tracing::warn!(error = %e, "submit aborted"),
            },
            Message::RestoreOriginal => workspace.restore_original(),
            Message::RestoreEntry(id) => {
                if !workspace.restore_entry(id) {
                    tracing::warn!(entry = id, "unknown history entry");
                }
            }
            Message::CompareStart => workspace.comparing = true,
            Message::CompareEnd => workspace.comparing = false,
            Message::Download => match workspace.session.current() {
                Some(asset) => {
                    return Task::perform(
                        files::download::save_asset(
                            Arc::clone(asset),
                            config.download_dir.clone(),
                        ),
                        |result| Message::Downloaded(result.map_err(|e| e.to_string())),
                    );
                }
                None => workspace.notice = Some(DownloadError::NothingToSave.to_string()),
            },
            Message::Downloaded(result) => {
                workspace.notice = Some(match result {
                    Ok(path) => format!("Saved to {}", path.display()),
                    Err(message) => {
                        tracing::warn!(error = %message, "download failed");
                        message
                    }
                });
            }
            _ => {}
        }
        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match &self.workspace {
            Some(workspace) => workspace.view(),
            None => ui::selector::view(&self.status, self.loading, self.has_api_key),
        }
    }

    /// Listen for dropped files while the start screen is showing
    fn subscription(&self) -> Subscription<Message> {
        if self.workspace.is_none() {
            iced::event::listen_with(ui::selector::dropped_file)
        } else {
            Subscription::none()
        }
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn main() -> iced::Result {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("nanoedit=info")),
        )
        .init();

    let config = Config::load();
    let client = match GeminiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    iced::application("NanoEdit", NanoEdit::update, NanoEdit::view)
        .theme(NanoEdit::theme)
        .subscription(NanoEdit::subscription)
        .centered()
        .run_with(move || NanoEdit::new(config, client))
}
